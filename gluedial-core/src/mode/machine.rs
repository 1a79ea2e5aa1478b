//! Mode and setup option definitions

/// Operating modes, in long-press cycle order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Dial in a length and dispense it
    #[default]
    Manual,
    /// Pick a saved part and dispense its length
    Parts,
    /// Drive the extruder back to home
    Retract,
    /// Calibration: set home or save the position as a part
    Setup,
}

impl Mode {
    /// Next mode in the cycle
    pub fn next(self) -> Self {
        match self {
            Mode::Manual => Mode::Parts,
            Mode::Parts => Mode::Retract,
            Mode::Retract => Mode::Setup,
            Mode::Setup => Mode::Manual,
        }
    }

    /// Short label for the display
    pub fn label(self) -> &'static str {
        match self {
            Mode::Manual => "MANUAL",
            Mode::Parts => "PARTS",
            Mode::Retract => "RETRACT",
            Mode::Setup => "SETUP",
        }
    }
}

/// Action performed by a short press in setup mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SetupOption {
    /// Make the current position home
    #[default]
    SetHome,
    /// Store the current position as a new part
    SaveAsPart,
}

impl SetupOption {
    /// The other option
    pub fn toggle(self) -> Self {
        match self {
            SetupOption::SetHome => SetupOption::SaveAsPart,
            SetupOption::SaveAsPart => SetupOption::SetHome,
        }
    }

    /// Short label for the display
    pub fn label(self) -> &'static str {
        match self {
            SetupOption::SetHome => "SET HOME",
            SetupOption::SaveAsPart => "SAVE PART",
        }
    }
}
