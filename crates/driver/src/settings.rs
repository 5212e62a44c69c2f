use anyhow::ensure;
use launchpad_library::{grid, Pad};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Drive the terminal simulator instead of real hardware.
    #[serde(default)]
    pub use_sim_pad: bool,

    /// Client name registered with the MIDI backend.
    #[serde(default = "default_client_name")]
    pub client_name: String,

    /// Substring to look for in MIDI port names during discovery.
    #[serde(default = "default_port_match")]
    pub port_match: String,

    /// Top-row control reserved for switching to the previous page.
    #[serde(default = "default_nav_previous")]
    pub nav_previous: u8,

    /// Top-row control reserved for switching to the next page.
    #[serde(default = "default_nav_next")]
    pub nav_next: u8,

    /// How long a simulated tap stays pressed, in milliseconds.
    #[serde(default = "default_press_pulse_ms")]
    pub press_pulse_ms: u64,
}

fn default_client_name() -> String {
    "launchpad-driver".into()
}

fn default_port_match() -> String {
    "Launchpad".into()
}

// The left and right arrow buttons of the top control row.
fn default_nav_previous() -> u8 {
    grid::CONTROL_ROW_BASE + 2
}

fn default_nav_next() -> u8 {
    grid::CONTROL_ROW_BASE + 3
}

fn default_press_pulse_ms() -> u64 {
    200
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            use_sim_pad: false,
            client_name: default_client_name(),
            port_match: default_port_match(),
            nav_previous: default_nav_previous(),
            nav_next: default_nav_next(),
            press_pulse_ms: default_press_pulse_ms(),
        }
    }
}

impl Settings {
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            Pad::from_control_id(self.nav_previous).is_some(),
            "nav_previous {:#04x} is not a top-row control",
            self.nav_previous
        );
        ensure!(
            Pad::from_control_id(self.nav_next).is_some(),
            "nav_next {:#04x} is not a top-row control",
            self.nav_next
        );
        ensure!(
            self.nav_previous != self.nav_next,
            "nav_previous and nav_next must be different controls"
        );
        ensure!(
            (1..=2000).contains(&self.press_pulse_ms),
            "press_pulse_ms must stay within 1..=2000"
        );
        ensure!(
            !self.port_match.is_empty(),
            "port_match must not be empty"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn navigation_controls_must_sit_on_the_top_row() {
        let mut settings = Settings::default();
        settings.nav_previous = 0x50;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.nav_next = grid::CONTROL_ROW_BASE + 8;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn navigation_controls_must_differ() {
        let mut settings = Settings::default();
        settings.nav_next = settings.nav_previous;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn press_pulse_is_bounded() {
        let mut settings = Settings::default();
        settings.press_pulse_ms = 0;
        assert!(settings.validate().is_err());

        settings.press_pulse_ms = 60_000;
        assert!(settings.validate().is_err());
    }
}
