//! Per-block [`Patch`] and [`PerformanceState`] assembly.

use annuli_core::clamp;

use crate::controls::{Jacks, Knobs};
use crate::engine::{Patch, PerformanceState};
use crate::shaper::{
    DEFAULT_PITCH_VOLTS, PATCH_CEILING, chord, frequency_modulation, modulate, modulate_raw, note,
    tonic,
};

/// Builds the timbral parameters for one block.
///
/// Returns the patch and the unclamped structure value, which selects the
/// chord.
pub fn build_patch(knobs: &Knobs, jacks: &Jacks) -> (Patch, f32) {
    let structure = modulate_raw(
        knobs.structure,
        knobs.structure_mod,
        jacks.structure_mod.normalize(0.0),
    );
    let patch = Patch {
        structure: clamp(structure, 0.0, PATCH_CEILING),
        brightness: modulate(
            knobs.brightness,
            knobs.brightness_mod,
            jacks.brightness_mod.normalize(0.0),
            0.0,
            1.0,
        ),
        damping: modulate(
            knobs.damping,
            knobs.damping_mod,
            jacks.damping_mod.normalize(0.0),
            0.0,
            PATCH_CEILING,
        ),
        position: modulate(
            knobs.position,
            knobs.position_mod,
            jacks.position_mod.normalize(0.0),
            0.0,
            PATCH_CEILING,
        ),
    };
    (patch, structure)
}

/// Builds the performance state for one block.
///
/// `strum` is the edge-detected strum pulse for this block; the strummer
/// may still override it.
pub fn build_performance(knobs: &Knobs, jacks: &Jacks, structure: f32, strum: bool) -> PerformanceState {
    PerformanceState {
        note: note(jacks.pitch.normalize(DEFAULT_PITCH_VOLTS)),
        tonic: tonic(knobs.frequency, jacks.pitch.connected),
        fm: frequency_modulation(knobs.frequency_mod, jacks.frequency_mod.normalize(1.0)),
        chord: chord(structure),
        strum,
        internal_exciter: !jacks.audio.connected,
        internal_strum: !jacks.strum.connected,
        internal_note: !jacks.pitch.connected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use annuli_platform::InputJack;

    #[test]
    fn test_defaults() {
        let (patch, structure) = build_patch(&Knobs::default(), &Jacks::default());
        assert_eq!(patch, Patch::default());
        assert_eq!(structure, 0.5);

        let perf = build_performance(&Knobs::default(), &Jacks::default(), structure, false);
        assert!((perf.note - 1.0).abs() < 1e-6);
        assert_eq!(perf.tonic, 42.0);
        assert_eq!(perf.fm, 0.0);
        assert_eq!(perf.chord, 5);
        assert!(perf.internal_exciter && perf.internal_strum && perf.internal_note);
    }

    #[test]
    fn test_connectivity_flags() {
        let jacks = Jacks {
            audio: InputJack::patched(0.0),
            strum: InputJack::patched(0.0),
            ..Jacks::default()
        };
        let perf = build_performance(&Knobs::default(), &jacks, 0.5, true);
        assert!(!perf.internal_exciter);
        assert!(!perf.internal_strum);
        assert!(perf.internal_note);
        assert!(perf.strum);
    }

    #[test]
    fn test_structure_chord_uses_unclamped_value() {
        let knobs = Knobs {
            structure: 0.9,
            structure_mod: 1.0,
            ..Knobs::default()
        };
        let jacks = Jacks {
            structure_mod: InputJack::patched(-5.0),
            ..Jacks::default()
        };
        // 0.9 - 3.3 = -2.4: patch clamps to 0, chord clamps to 0.
        let (patch, structure) = build_patch(&knobs, &jacks);
        assert_eq!(patch.structure, 0.0);
        assert!(structure < 0.0);
        assert_eq!(chord(structure), 0);
    }

    #[test]
    fn test_pitch_patched_quantizes_transpose() {
        let knobs = Knobs {
            frequency: 17.3,
            ..Knobs::default()
        };
        let patched = Jacks {
            pitch: InputJack::patched(2.0),
            ..Jacks::default()
        };
        let perf = build_performance(&knobs, &patched, 0.5, false);
        assert_eq!(perf.tonic, 29.0);
        assert_eq!(perf.note, 24.0);
        assert!(!perf.internal_note);

        let perf = build_performance(&knobs, &Jacks::default(), 0.5, false);
        assert!((perf.tonic - 29.3).abs() < 1e-5);
    }

    #[test]
    fn test_unpatched_fm_acts_as_fine_tune() {
        let knobs = Knobs {
            frequency_mod: 0.5,
            ..Knobs::default()
        };
        let perf = build_performance(&knobs, &Jacks::default(), 0.5, false);
        // 48 · 3.3 · 0.0625 · 1 / 5
        assert!((perf.fm - 1.98).abs() < 1e-5, "got {}", perf.fm);
    }
}
