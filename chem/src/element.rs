/// Elements understood by the SMILES parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Element {
    H,
    B,
    C,
    N,
    O,
    F,
    Si,
    P,
    S,
    Cl,
    Se,
    Br,
    I,
}

impl Element {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        let element = match symbol {
            "H" => Self::H,
            "B" => Self::B,
            "C" => Self::C,
            "N" => Self::N,
            "O" => Self::O,
            "F" => Self::F,
            "Si" => Self::Si,
            "P" => Self::P,
            "S" => Self::S,
            "Cl" => Self::Cl,
            "Se" => Self::Se,
            "Br" => Self::Br,
            "I" => Self::I,
            _ => return None,
        };
        Some(element)
    }

    /// Lowercase aromatic spelling, e.g. `c` or `se`.
    pub fn from_aromatic_symbol(symbol: &str) -> Option<Self> {
        let element = match symbol {
            "b" => Self::B,
            "c" => Self::C,
            "n" => Self::N,
            "o" => Self::O,
            "p" => Self::P,
            "s" => Self::S,
            "se" => Self::Se,
            _ => return None,
        };
        Some(element)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::H => "H",
            Self::B => "B",
            Self::C => "C",
            Self::N => "N",
            Self::O => "O",
            Self::F => "F",
            Self::Si => "Si",
            Self::P => "P",
            Self::S => "S",
            Self::Cl => "Cl",
            Self::Se => "Se",
            Self::Br => "Br",
            Self::I => "I",
        }
    }

    pub fn atomic_number(self) -> u8 {
        match self {
            Self::H => 1,
            Self::B => 5,
            Self::C => 6,
            Self::N => 7,
            Self::O => 8,
            Self::F => 9,
            Self::Si => 14,
            Self::P => 15,
            Self::S => 16,
            Self::Cl => 17,
            Self::Se => 34,
            Self::Br => 35,
            Self::I => 53,
        }
    }

    /// Standard atomic weight in g/mol.
    pub fn atomic_mass(self) -> f64 {
        match self {
            Self::H => 1.008,
            Self::B => 10.81,
            Self::C => 12.011,
            Self::N => 14.007,
            Self::O => 15.999,
            Self::F => 18.998,
            Self::Si => 28.085,
            Self::P => 30.974,
            Self::S => 32.06,
            Self::Cl => 35.45,
            Self::Se => 78.971,
            Self::Br => 79.904,
            Self::I => 126.904,
        }
    }

    /// Allowed valences in increasing order.
    pub fn default_valences(self) -> &'static [u8] {
        match self {
            Self::H | Self::F | Self::Cl | Self::Br | Self::I => &[1],
            Self::B => &[3],
            Self::C | Self::Si => &[4],
            Self::N | Self::P => &[3, 5],
            Self::O => &[2],
            Self::S | Self::Se => &[2, 4, 6],
        }
    }

    pub fn max_valence(self) -> u8 {
        self.default_valences().last().copied().unwrap_or(0)
    }

    /// Members of the SMILES organic subset may be written without brackets.
    pub fn is_organic_subset(self) -> bool {
        matches!(
            self,
            Self::B
                | Self::C
                | Self::N
                | Self::O
                | Self::P
                | Self::S
                | Self::F
                | Self::Cl
                | Self::Br
                | Self::I
        )
    }

    /// Aromatic atoms of these elements contribute an electron to the pi
    /// system from a bond rather than a lone pair.
    pub(crate) fn takes_aromatic_valence(self) -> bool {
        matches!(self, Self::B | Self::C | Self::N | Self::P)
    }

    pub fn is_heteroatom(self) -> bool {
        !matches!(self, Self::C | Self::H)
    }
}
