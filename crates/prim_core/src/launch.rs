//! Launch geometry helpers: work-unit counts to workgroup dispatches.

/// Number of work units and how many run per group. `group_size` is never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchConfig {
    units: u32,
    group_size: u32,
}

impl LaunchConfig {
    pub fn new(units: u32, group_size: u32) -> Self {
        Self {
            units,
            group_size: group_size.max(1),
        }
    }

    pub const fn units(&self) -> u32 {
        self.units
    }

    pub const fn group_size(&self) -> u32 {
        self.group_size
    }

    /// Groups needed to cover every unit.
    pub const fn workgroups(&self) -> u32 {
        div_ceil(self.units, self.group_size)
    }
}

/// Ceiling division without the `value + divisor - 1` overflow. `divisor` must be non-zero.
pub const fn div_ceil(value: u32, divisor: u32) -> u32 {
    value / divisor + (value % divisor != 0) as u32
}

pub const fn is_power_of_two(x: u32) -> bool {
    x > 0 && (x & (x - 1)) == 0
}

/// Largest power of two a `u32` holds.
pub const MAX_POWER_OF_TWO: u32 = 1 << 31;

/// Smallest power of two `>= x` (1 for 0), saturating at [`MAX_POWER_OF_TWO`].
pub const fn next_power_of_two(x: u32) -> u32 {
    if x > MAX_POWER_OF_TWO {
        return MAX_POWER_OF_TWO;
    }
    let mut acc = 1;
    while acc < x {
        acc *= 2;
    }
    acc
}

/// Lane count for a group of `group_size`: the full warp when the group fills
/// it, otherwise the group size rounded up to a power of two.
pub const fn min_warp_size(group_size: u32, max_warp_size: u32) -> u32 {
    if group_size >= max_warp_size {
        max_warp_size
    } else {
        next_power_of_two(group_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workgroups_round_up() {
        assert_eq!(LaunchConfig::new(256, 64).workgroups(), 4);
        assert_eq!(LaunchConfig::new(257, 64).workgroups(), 5);
        assert_eq!(LaunchConfig::new(0, 64).workgroups(), 0);
        assert_eq!(LaunchConfig::new(3, 0).group_size(), 1);
        assert_eq!(LaunchConfig::new(3, 0).workgroups(), 3);
        assert_eq!(LaunchConfig::new(u32::MAX, 64).workgroups(), 67_108_864);
    }

    #[test]
    fn power_of_two_helpers() {
        assert!(is_power_of_two(64));
        assert!(!is_power_of_two(0));
        assert!(!is_power_of_two(96));
        assert_eq!(next_power_of_two(0), 1);
        assert_eq!(next_power_of_two(33), 64);
        assert_eq!(next_power_of_two(64), 64);
        assert_eq!(next_power_of_two(MAX_POWER_OF_TWO), MAX_POWER_OF_TWO);
        assert_eq!(next_power_of_two(MAX_POWER_OF_TWO + 1), MAX_POWER_OF_TWO);
        assert_eq!(next_power_of_two(u32::MAX), MAX_POWER_OF_TWO);
        assert_eq!(min_warp_size(u32::MAX, u32::MAX), u32::MAX);
    }

    #[test]
    fn warp_size_for_small_groups() {
        assert_eq!(min_warp_size(256, 64), 64);
        assert_eq!(min_warp_size(20, 64), 32);
        assert_eq!(min_warp_size(64, 64), 64);
    }
}
