// SPDX-License-Identifier: LGPL-3.0-or-later

//! Solo/mute resolution.
//!
//! Evaluated once per control-rate update over a group of siblings (the
//! channels of a plugin, or the generators of a pool): when any sibling is
//! soloed only the soloed ones play and mute is ignored, otherwise every
//! sibling plays unless muted.

/// Whether any of the given solo flags is set.
pub fn has_solo<I>(solos: I) -> bool
where
    I: IntoIterator<Item = bool>,
{
    solos.into_iter().any(|solo| solo)
}

/// Activity of one sibling.
#[inline]
pub fn is_active(has_solo: bool, solo: bool, mute: bool) -> bool {
    if has_solo {
        solo
    } else {
        !mute
    }
}

/// Resolve the activity of every `(solo, mute)` pair into `dst`.
pub fn resolve(flags: &[(bool, bool)], dst: &mut [bool]) {
    let any = has_solo(flags.iter().map(|&(solo, _)| solo));
    for (d, &(solo, mute)) in dst.iter_mut().zip(flags.iter()) {
        *d = is_active(any, solo, mute);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_solo_follows_mute() {
        let mut active = [false; 3];
        resolve(&[(false, false), (false, true), (false, false)], &mut active);
        assert_eq!(active, [true, false, true]);
    }

    #[test]
    fn test_solo_overrides_mute() {
        let mut active = [false; 3];
        resolve(&[(true, true), (false, false), (false, true)], &mut active);
        assert_eq!(active, [true, false, false]);
    }

    #[test]
    fn test_exhaustive_small_groups() {
        // Every flag combination for three siblings.
        for bits in 0u32..64 {
            let flags: Vec<(bool, bool)> = (0..3)
                .map(|i| (bits & (1 << (2 * i)) != 0, bits & (1 << (2 * i + 1)) != 0))
                .collect();
            let mut active = [false; 3];
            resolve(&flags, &mut active);

            let any_solo = flags.iter().any(|f| f.0);
            for (i, &(solo, mute)) in flags.iter().enumerate() {
                let expected = if any_solo { solo } else { !mute };
                assert_eq!(active[i], expected, "bits={bits:06b} sibling={i}");
            }
        }
    }

    #[test]
    fn test_empty_group() {
        assert!(!has_solo(std::iter::empty()));
        resolve(&[], &mut []);
    }
}
