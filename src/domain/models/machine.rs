use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FanSpeed {
    #[default]
    Off,
    Low,
    Medium,
    High,
}

/// Snapshot of one vending machine's power budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineState {
    /// 0..=100
    pub battery_percentage: f64,
    /// Fraction of optimal sunlight reaching the panel, 0..=1.
    pub solar_efficiency: f64,
    #[serde(default)]
    pub is_charging: bool,
    #[serde(default)]
    pub is_payment_machine_on: bool,
    #[serde(default)]
    pub is_light_on: bool,
    #[serde(default)]
    pub fan_speed: FanSpeed,
}

/// Derived figures shown next to a machine on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineEstimates {
    pub max_glasses: u32,
    pub drain_rate_per_hour: f64,
    pub production_efficiency: f64,
    /// `None` when there is no sunlight to charge from.
    pub hours_to_full_charge: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sugarcanes_needed: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_enough_battery: Option<bool>,
}
