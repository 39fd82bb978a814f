use crate::domain::models::machine::{FanSpeed, MachineEstimates, MachineState};

pub const JUICE_YIELD_PER_SUGARCANE_ML: u32 = 250;
pub const GLASS_ML: u32 = 200;
pub const BATTERY_PER_GLASS: f64 = 0.5;
pub const CHARGE_RATE_PER_HOUR: f64 = 5.0;
pub const PAYMENT_MACHINE_PER_HOUR: f64 = 0.1;
pub const LIGHT_PER_HOUR: f64 = 0.2;

pub fn fan_drain_per_hour(speed: FanSpeed) -> f64 {
    match speed {
        FanSpeed::Off => 0.0,
        FanSpeed::Low => 0.3,
        FanSpeed::Medium => 0.5,
        FanSpeed::High => 0.8,
    }
}

pub fn sugarcanes_needed(glasses: u32) -> u32 {
    glasses.saturating_mul(GLASS_ML).div_ceil(JUICE_YIELD_PER_SUGARCANE_ML)
}

pub fn max_glasses(battery_percentage: f64) -> u32 {
    (battery_percentage.max(0.0) / BATTERY_PER_GLASS).floor() as u32
}

pub fn has_enough_battery(glasses: u32, battery_percentage: f64) -> bool {
    f64::from(glasses) * BATTERY_PER_GLASS <= battery_percentage
}

/// Hourly battery drain of the appliances currently switched on.
pub fn drain_rate(state: &MachineState) -> f64 {
    let mut rate = fan_drain_per_hour(state.fan_speed);
    if state.is_payment_machine_on {
        rate += PAYMENT_MACHINE_PER_HOUR;
    }
    if state.is_light_on {
        rate += LIGHT_PER_HOUR;
    }
    rate
}

pub fn charging_time_hours(battery_percentage: f64, solar_efficiency: f64) -> Option<f64> {
    let rate = CHARGE_RATE_PER_HOUR * solar_efficiency;
    (rate > 0.0).then(|| (100.0 - battery_percentage).max(0.0) / rate)
}

/// Production slows down linearly below 20 % battery.
pub fn efficiency(battery_percentage: f64) -> f64 {
    if battery_percentage < 20.0 {
        0.7 + (battery_percentage / 100.0) * 0.3
    } else {
        1.0
    }
}

/// Advances the machine by `dt_hours`: solar charge (when charging) minus appliance drain,
/// clamped to 0..=100. Pure; the caller owns the clock.
pub fn next_state(state: &MachineState, dt_hours: f64) -> MachineState {
    let dt = dt_hours.max(0.0);
    let charge = if state.is_charging {
        CHARGE_RATE_PER_HOUR * state.solar_efficiency * dt
    } else {
        0.0
    };
    let battery = (state.battery_percentage + charge - drain_rate(state) * dt).clamp(0.0, 100.0);

    MachineState {
        battery_percentage: battery,
        ..state.clone()
    }
}

pub fn estimates(state: &MachineState, glasses: Option<u32>) -> MachineEstimates {
    MachineEstimates {
        max_glasses: max_glasses(state.battery_percentage),
        drain_rate_per_hour: drain_rate(state),
        production_efficiency: efficiency(state.battery_percentage),
        hours_to_full_charge: charging_time_hours(state.battery_percentage, state.solar_efficiency),
        sugarcanes_needed: glasses.map(sugarcanes_needed),
        has_enough_battery: glasses.map(|g| has_enough_battery(g, state.battery_percentage)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(battery: f64) -> MachineState {
        MachineState {
            battery_percentage: battery,
            solar_efficiency: 1.0,
            is_charging: false,
            is_payment_machine_on: false,
            is_light_on: false,
            fan_speed: FanSpeed::Off,
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn sugarcane_count_rounds_up() {
        assert_eq!(sugarcanes_needed(0), 0);
        assert_eq!(sugarcanes_needed(1), 1);
        assert_eq!(sugarcanes_needed(5), 4);
        assert_eq!(sugarcanes_needed(10), 8);
    }

    #[test]
    fn battery_budget_per_glass() {
        assert_eq!(max_glasses(50.0), 100);
        assert_eq!(max_glasses(0.9), 1);
        assert!(has_enough_battery(100, 50.0));
        assert!(!has_enough_battery(101, 50.0));
    }

    #[test]
    fn drain_sums_running_appliances() {
        let mut s = state(80.0);
        assert!(approx(drain_rate(&s), 0.0));
        s.is_payment_machine_on = true;
        s.is_light_on = true;
        s.fan_speed = FanSpeed::High;
        assert!(approx(drain_rate(&s), 1.1));
    }

    #[test]
    fn efficiency_drops_below_twenty_percent() {
        assert!(approx(efficiency(50.0), 1.0));
        assert!(approx(efficiency(20.0), 1.0));
        assert!(approx(efficiency(10.0), 0.73));
        assert!(approx(efficiency(0.0), 0.7));
    }

    #[test]
    fn charging_time_needs_sunlight() {
        assert_eq!(charging_time_hours(50.0, 0.0), None);
        assert!(approx(charging_time_hours(50.0, 1.0).unwrap(), 10.0));
        assert!(approx(charging_time_hours(90.0, 0.5).unwrap(), 4.0));
    }

    #[test]
    fn next_state_charges_and_drains() {
        let mut s = state(50.0);
        s.is_charging = true;
        s.solar_efficiency = 0.8;
        s.fan_speed = FanSpeed::Medium;
        let next = next_state(&s, 2.0);
        // +5*0.8*2 = 8, -0.5*2 = 1
        assert!(approx(next.battery_percentage, 57.0));
        assert_eq!(next.fan_speed, FanSpeed::Medium);
    }

    #[test]
    fn next_state_clamps() {
        let mut s = state(99.0);
        s.is_charging = true;
        assert!(approx(next_state(&s, 10.0).battery_percentage, 100.0));

        let mut s = state(0.5);
        s.is_light_on = true;
        assert!(approx(next_state(&s, 10.0).battery_percentage, 0.0));
    }

    #[test]
    fn negative_elapsed_time_is_a_no_op() {
        let mut s = state(40.0);
        s.is_charging = true;
        assert_eq!(next_state(&s, -3.0), s);
    }
}
