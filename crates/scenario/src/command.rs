use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scenario {
    InitialSync,
    NodeIsolation,
    DegradedTransactions,
    Recovery,
}

impl Scenario {
    pub const ALL: [Scenario; 4] =
        [Self::InitialSync, Self::NodeIsolation, Self::DegradedTransactions, Self::Recovery];

    pub fn number(self) -> u8 {
        match self {
            Self::InitialSync => 1,
            Self::NodeIsolation => 2,
            Self::DegradedTransactions => 3,
            Self::Recovery => 4,
        }
    }

    pub fn from_number(number: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.number() == number)
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::InitialSync => "Initial Synchronization Test",
            Self::NodeIsolation => "Manual Node Isolation",
            Self::DegradedTransactions => "Transactions While Degraded",
            Self::Recovery => "Recovery And Re-sync",
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Scenario {}: {}", self.number(), self.title())
    }
}

/// One entry of the interactive menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Run(Scenario),
    RunAll,
    Status,
    VerifyImmutability,
    Exit,
}

impl Command {
    /// Menu entries in display order.
    pub const MENU: [Command; 8] = [
        Self::Run(Scenario::InitialSync),
        Self::Run(Scenario::NodeIsolation),
        Self::Run(Scenario::DegradedTransactions),
        Self::Run(Scenario::Recovery),
        Self::RunAll,
        Self::Status,
        Self::VerifyImmutability,
        Self::Exit,
    ];

    pub fn choice(self) -> u8 {
        match self {
            Self::Run(scenario) => scenario.number(),
            Self::RunAll => 5,
            Self::Status => 6,
            Self::VerifyImmutability => 7,
            Self::Exit => 0,
        }
    }

    pub fn label(self) -> String {
        match self {
            Self::Run(scenario) => scenario.to_string(),
            Self::RunAll => "Run Full Experiment".to_string(),
            Self::Status => "Check Network Status".to_string(),
            Self::VerifyImmutability => "Verify Blockchain Immutability".to_string(),
            Self::Exit => "Exit".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid choice '{0}'")]
pub struct InvalidChoice(pub String);

impl FromStr for Command {
    type Err = InvalidChoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let choice = s.trim();
        choice
            .parse::<u8>()
            .ok()
            .and_then(|n| Self::MENU.into_iter().find(|c| c.choice() == n))
            .ok_or_else(|| InvalidChoice(choice.to_string()))
    }
}
