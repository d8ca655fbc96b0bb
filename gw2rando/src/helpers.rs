use rand::Rng;

// Rounds up with probability equal to the fractional part.
pub fn random_round<R: Rng + ?Sized>(rng: &mut R, value: f64) -> usize {
    let floor = value.floor();
    let frac = value - floor;
    let round_up = frac > 0.0 && rng.gen::<f64>() < frac;
    floor.max(0.0) as usize + round_up as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_random_round() {
        let mut rng = rand::rngs::StdRng::from_seed([0u8; 32]);
        assert_eq!(random_round(&mut rng, 2.0), 2);
        assert_eq!(random_round(&mut rng, 0.0), 0);
        for _ in 0..100 {
            let x = random_round(&mut rng, 1.5);
            assert!(x == 1 || x == 2);
        }
    }
}
