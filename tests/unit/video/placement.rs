use super::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

#[test]
fn ciphers_repeat_short_alphabets() {
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let ciphers = assign_ciphers(&['a', 'b', 'c'], 8, 3, &mut rng).unwrap();
    assert_eq!(ciphers.len(), 3);
    for c in &ciphers {
        assert_eq!(c.chars().count(), 8);
        assert!(c.chars().all(|ch| "abc".contains(ch)));
        // The pool holds each letter three times.
        for ch in ['a', 'b', 'c'] {
            assert!(c.chars().filter(|&x| x == ch).count() <= 3);
        }
    }
}

#[test]
fn ciphers_from_long_alphabet_are_distinct_characters() {
    let alphabet: Vec<char> = "0123456789".chars().collect();
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    let ciphers = assign_ciphers(&alphabet, 5, 1, &mut rng).unwrap();
    let mut chars: Vec<char> = ciphers[0].chars().collect();
    chars.sort_unstable();
    chars.dedup();
    assert_eq!(chars.len(), 5);
    assert!(assign_ciphers(&[], 5, 1, &mut rng).is_err());
}

#[test]
fn positions_are_sorted_unique_and_in_range() {
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    for _ in 0..20 {
        let p = select_positions(50, 12, &mut rng).unwrap();
        assert_eq!(p.len(), 12);
        assert!(p.windows(2).all(|w| w[0] < w[1]));
        assert!(p.iter().all(|&i| i < 50));
    }
    assert_eq!(select_positions(4, 4, &mut rng).unwrap(), vec![0, 1, 2, 3]);
    assert!(select_positions(4, 5, &mut rng).is_err());
}

#[test]
fn locations_stay_inside_the_margin() {
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    let locs = select_locations(64, 48, 6, 10, 3, &mut rng).unwrap();
    assert_eq!(locs.len(), 10);
    for per_frame in &locs {
        assert_eq!(per_frame.len(), 3);
        for &(x, y) in per_frame {
            assert!((12..=52).contains(&x));
            assert!((12..=36).contains(&y));
        }
    }
}

#[test]
fn locations_reject_small_frames() {
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    assert!(select_locations(47, 48, 12, 1, 1, &mut rng).is_err());
    assert!(select_locations(48, 48, 12, 1, 1, &mut rng).is_ok());
    assert!(select_locations(64, 64, 4, 1, 0, &mut rng).is_err());
}
