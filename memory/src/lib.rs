//! # Molforge Memory
//!
//! State that persists across training steps:
//! - the scaffold diversity filter that attenuates repeated chemotypes
//! - the inception replay memory of high-scoring SMILES
//! - the result ledger written as `memory.csv`

pub mod diversity_filter;
pub mod error;
pub mod inception;
pub mod result_memory;

pub use diversity_filter::{BucketMember, DiversityFilter, ScaffoldBucket};
pub use error::{MemoryError, MemoryResult};
pub use inception::{InceptionEntry, InceptionMemory};
pub use result_memory::{ResultEntry, ResultMemory};
