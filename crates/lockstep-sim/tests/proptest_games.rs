//! Property tests: generated games survive save and load unchanged.

use lockstep_sim::prelude::*;
use proptest::prelude::*;

fn settings_strategy() -> impl Strategy<Value = GameSettings> {
    (
        1u8..=4,
        prop_oneof![
            Just(Objective::None),
            Just(Objective::Conquer),
            Just(Objective::EconomyMode)
        ],
        (4u16..=24).prop_map(|n| n * 2),
        (4u16..=24).prop_map(|n| n * 2),
    )
        .prop_map(|(players, objective, map_width, map_height)| GameSettings {
            players,
            objective,
            map_width,
            map_height,
        })
}

fn population_strategy() -> impl Strategy<Value = Population> {
    (0usize..10, 0usize..60, 0usize..3).prop_map(|(flags_per_player, decorations, ships_per_player)| {
        Population {
            flags_per_player,
            decorations,
            ships_per_player,
        }
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn save_load_save_is_stable(
        settings in settings_strategy(),
        population in population_strategy(),
        seed in any::<u64>(),
    ) {
        let config = SnapshotConfig::default();
        let game = generate_with(settings.clone(), &population, seed).unwrap();
        let first = game.save(&config).unwrap();
        let loaded = Game::load(settings, first.bytes(), &config).unwrap();
        let second = loaded.save(&config).unwrap();
        prop_assert_eq!(first.bytes(), second.bytes());
        prop_assert_eq!(loaded.world(), game.world());
        prop_assert_eq!(loaded.players(), game.players());
    }

    #[test]
    fn flipped_bytes_never_panic(seed in any::<u64>(), flip in any::<prop::sample::Index>(), mask in 1u8..) {
        let settings = GameSettings { map_width: 12, map_height: 12, ..GameSettings::default() };
        let population = Population { flags_per_player: 3, decorations: 10, ships_per_player: 1 };
        let game = generate_with(settings.clone(), &population, seed).unwrap();
        let mut bytes = game.save(&SnapshotConfig::default()).unwrap().into_bytes();
        let at = flip.index(bytes.len());
        bytes[at] ^= mask;
        // Any outcome is fine as long as it is reported rather than panicking.
        let _ = Game::load(settings, &bytes, &SnapshotConfig::default());
    }
}
