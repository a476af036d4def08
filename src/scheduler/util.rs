/// Écart-type de population (ddof = 0). Vaut 0 pour une série vide.
pub(super) fn std_dev(values: &[u32]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().map(|v| f64::from(*v)).sum::<f64>() / n;
    let var = values
        .iter()
        .map(|v| {
            let d = f64::from(*v) - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    var.sqrt()
}

/// Graine de l'essai `trial` dérivée de la graine de recherche.
pub(super) fn trial_seed(base: u64, trial: u64) -> u64 {
    // splitmix64
    let mut z = base.wrapping_add(trial.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn std_dev_of_flat_series_is_zero() {
        assert_eq!(std_dev(&[4, 4, 4]), 0.0);
        assert_eq!(std_dev(&[]), 0.0);
    }

    #[test]
    fn std_dev_population() {
        // moyenne 5, écarts ±3 → variance 9
        let sd = std_dev(&[2, 8]);
        assert!((sd - 3.0).abs() < 1e-9);
    }

    #[test]
    fn trial_seeds_differ() {
        assert_ne!(trial_seed(7, 0), trial_seed(7, 1));
        assert_eq!(trial_seed(7, 3), trial_seed(7, 3));
    }
}
