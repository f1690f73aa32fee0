use serde::Deserialize;

/// Index into the substance catalog. Id 0 is always the `nothing` sentinel.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct SubstanceId(pub u16);

/// Index into the prototype catalog. Id 0 is always the `anomaly` sentinel.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct PrototypeId(pub u16);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Empty,
    Solid,
    Liquid,
    Gas,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Invisible,
    Transparent,
    Opaque,
}

/// Deposit categories, in the order the deposit pass runs them.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum DepositKind {
    Large = 0,
    Small = 1,
    Vein = 2,
    Solitary = 3,
    Gangue = 4,
}

impl DepositKind {
    pub const ALL: [DepositKind; 5] = [
        DepositKind::Large,
        DepositKind::Small,
        DepositKind::Vein,
        DepositKind::Solitary,
        DepositKind::Gangue,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            DepositKind::Large => "large",
            DepositKind::Small => "small",
            DepositKind::Vein => "vein",
            DepositKind::Solitary => "solitary",
            DepositKind::Gangue => "gangue",
        }
    }
}
