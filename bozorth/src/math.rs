use crate::types::Minutia;

#[inline]
pub(crate) fn euclidean_distance(a: &Minutia, b: &Minutia) -> f64 {
    let dx = f64::from(b.x - a.x);
    let dy = f64::from(b.y - a.y);
    (dx * dx + dy * dy).sqrt()
}

/// Circular difference of two orientations, folded into `0..=180`.
#[inline]
pub(crate) fn angular_difference(a: &Minutia, b: &Minutia) -> i32 {
    let difference = (a.theta - b.theta).abs() % 360;
    if difference > 180 {
        360 - difference
    } else {
        difference
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance() {
        let a = Minutia::new(0, 0, 0);
        let b = Minutia::new(3, 4, 0);
        assert_eq!(euclidean_distance(&a, &b), 5.0);
        assert_eq!(euclidean_distance(&b, &a), 5.0);
        assert_eq!(euclidean_distance(&a, &a), 0.0);
    }

    #[test]
    fn angles_are_folded() {
        let at = |theta| Minutia::new(0, 0, theta);
        assert_eq!(angular_difference(&at(0), &at(90)), 90);
        assert_eq!(angular_difference(&at(0), &at(180)), 180);
        assert_eq!(angular_difference(&at(10), &at(350)), 20);
        assert_eq!(angular_difference(&at(350), &at(10)), 20);
        assert_eq!(angular_difference(&at(359), &at(0)), 1);
        assert_eq!(angular_difference(&at(45), &at(45)), 0);
    }

    #[test]
    fn angles_stay_in_range() {
        for a in (0..360).step_by(7) {
            for b in (0..360).step_by(11) {
                let difference = angular_difference(&Minutia::new(0, 0, a), &Minutia::new(1, 1, b));
                assert!((0..=180).contains(&difference), "{} {} -> {}", a, b, difference);
            }
        }
    }
}
