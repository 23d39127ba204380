use colored::Colorize;
use config::ConfigIssue;
use errors::{ErrorClass, MolforgeError};

#[derive(Debug)]
pub struct UxError {
    pub what: String,
    pub why: Option<String>,
    pub how_to_fix: Vec<String>,
    pub suggested_command: Option<String>,
}

impl UxError {
    pub fn new(what: impl Into<String>) -> Self {
        Self {
            what: what.into(),
            why: None,
            how_to_fix: Vec::new(),
            suggested_command: None,
        }
    }

    pub fn why(mut self, reason: impl Into<String>) -> Self {
        self.why = Some(reason.into());
        self
    }

    pub fn fix(mut self, suggestion: impl Into<String>) -> Self {
        self.how_to_fix.push(suggestion.into());
        self
    }

    pub fn suggest(mut self, cmd: impl Into<String>) -> Self {
        self.suggested_command = Some(cmd.into());
        self
    }

    pub fn display(&self) {
        eprintln!();
        eprintln!("{} {}", "error:".red().bold(), self.what.white().bold());

        if let Some(why) = &self.why {
            eprintln!("       {}", why.dimmed());
        }

        if !self.how_to_fix.is_empty() {
            eprintln!();
            eprintln!("{}", "How to fix:".yellow().bold());
            for (i, fix) in self.how_to_fix.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, fix);
            }
        }

        if let Some(cmd) = &self.suggested_command {
            eprintln!();
            eprintln!("{}", "Try this:".green().bold());
            eprintln!("  $ {}", cmd.cyan());
        }
        eprintln!();
    }
}

impl std::fmt::Display for UxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.what)
    }
}

impl std::error::Error for UxError {}

pub fn invalid_configuration(path: &str, issues: &[ConfigIssue]) -> UxError {
    let mut err = UxError::new(format!("Configuration '{}' is invalid", path)).why(format!(
        "{} problem{} found",
        issues.len(),
        if issues.len() == 1 { "" } else { "s" }
    ));
    for issue in issues {
        err = err.fix(format!("{}: {}", issue.field, issue.reason));
    }
    err.suggest(format!("molforge validate {}", path))
}

/// Maps a library error onto guidance for the person at the terminal.
pub fn from_molforge(err: &MolforgeError, config_path: &str) -> UxError {
    match (err.class(), err) {
        (_, MolforgeError::Resource { path, reason }) => {
            UxError::new(format!("Cannot use '{}'", path))
                .why(reason.clone())
                .fix("Check that the path exists and is readable or writable")
                .fix("Relative paths resolve against the current directory")
        }
        (ErrorClass::Configuration, _) => UxError::new(format!("Configuration '{}' is invalid", config_path))
            .why(err.to_string())
            .fix("Correct the field named above")
            .suggest(format!("molforge validate {}", config_path)),
        (ErrorClass::Checkpoint, _) => UxError::new("Model checkpoint cannot be used")
            .why(err.to_string())
            .fix("Point the configuration at a checkpoint written by molforge")
            .fix("Create a fresh prior with a create_model run"),
        _ => UxError::new("Run failed").why(err.to_string()),
    }
}
