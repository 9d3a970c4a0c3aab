//! Per-cycle outcome and stat line generation.

use rand::Rng;

/// Positive objective traits.
pub const OBJECTIVE_GOOD: &[&str] = &[
    "jaw dominance",
    "hunter eyes",
    "bone structure",
    "nice nose",
    "golden ratio",
    "cheekbones",
    "jaw angle",
    "chad energy",
];

/// Positive subjective traits.
pub const FUNNY_GOOD: &[&str] = &[
    "has 401k",
    "has sex",
    "fucks",
    "doesnt listen to travis scott",
    "alpha vibes",
    "aura",
    "rizz",
    "gyatt",
    "potentially gay",
    "zesty",
    "voted for zohran",
];

/// Negative objective traits.
pub const OBJECTIVE_BAD: &[&str] = &[
    "weak chin",
    "receding hairline",
    "predator eyes",
    "bad skin",
    "weak jawline",
];

/// Negative subjective traits.
pub const FUNNY_BAD: &[&str] = &[
    "no sex appeal",
    "watches ig reels",
    "social anxiety",
    "incel",
    "uses hinge",
];

/// Outcome and stat lines locked in for one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleContent {
    pub will_be_mogging: bool,
    /// Exactly three `"<sign><1-9> <phrase>"` lines
    pub stats: Vec<String>,
}

/// Flip the cycle outcome and draw its three stat lines.
///
/// Mogging cycles get two objective and one subjective positive trait;
/// mogged cycles get two subjective and one objective negative trait.
/// Draws are independent, so a phrase may repeat.
pub fn generate_cycle<R: Rng>(rng: &mut R) -> CycleContent {
    let will_be_mogging = rng.random_bool(0.5);

    let picks: [&[&str]; 3] = if will_be_mogging {
        [OBJECTIVE_GOOD, OBJECTIVE_GOOD, FUNNY_GOOD]
    } else {
        [FUNNY_BAD, FUNNY_BAD, OBJECTIVE_BAD]
    };

    let stats = picks
        .iter()
        .map(|phrases| {
            let phrase = phrases[rng.random_range(0..phrases.len())];
            format_stat(phrase, will_be_mogging, rng.random_range(1..=9))
        })
        .collect();

    CycleContent {
        will_be_mogging,
        stats,
    }
}

fn format_stat(phrase: &str, positive: bool, magnitude: u8) -> String {
    let sign = if positive { '+' } else { '-' };
    format!("{sign}{magnitude} {phrase}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn split(stat: &str) -> (char, u8, &str) {
        let mut chars = stat.chars();
        let sign = chars.next().unwrap();
        let digit = chars.next().unwrap().to_digit(10).unwrap() as u8;
        assert_eq!(chars.next(), Some(' '));
        (sign, digit, &stat[3..])
    }

    #[test]
    fn test_format_stat() {
        assert_eq!(format_stat("aura", true, 7), "+7 aura");
        assert_eq!(format_stat("incel", false, 1), "-1 incel");
    }

    #[test]
    fn test_generated_content_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let content = generate_cycle(&mut rng);
            assert_eq!(content.stats.len(), 3);

            let expected_sign = if content.will_be_mogging { '+' } else { '-' };
            let (first, second, third) = if content.will_be_mogging {
                (OBJECTIVE_GOOD, OBJECTIVE_GOOD, FUNNY_GOOD)
            } else {
                (FUNNY_BAD, FUNNY_BAD, OBJECTIVE_BAD)
            };

            for (stat, set) in content.stats.iter().zip([first, second, third]) {
                let (sign, digit, phrase) = split(stat);
                assert_eq!(sign, expected_sign);
                assert!((1..=9).contains(&digit));
                assert!(set.contains(&phrase), "{phrase} not in expected set");
            }
        }
    }

    #[test]
    fn test_both_outcomes_occur() {
        let mut rng = StdRng::seed_from_u64(42);
        let outcomes: Vec<bool> = (0..100)
            .map(|_| generate_cycle(&mut rng).will_be_mogging)
            .collect();
        assert!(outcomes.contains(&true));
        assert!(outcomes.contains(&false));
    }

    #[test]
    fn test_same_seed_same_content() {
        let a = generate_cycle(&mut StdRng::seed_from_u64(99));
        let b = generate_cycle(&mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
    }
}
