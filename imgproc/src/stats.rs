use ifp_core::{FloatImage, Image};
use rayon::prelude::*;

fn mean_std(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let mut n = 0usize;
    let mut sum = 0.0f64;
    let mut sum_sq = 0.0f64;
    for v in values {
        n += 1;
        sum += v;
        sum_sq += v * v;
    }
    if n == 0 {
        return (0.0, 0.0);
    }
    let mean = sum / n as f64;
    let var = (sum_sq / n as f64 - mean * mean).max(0.0);
    (mean, var.sqrt())
}

/// Population mean and standard deviation of every channel.
pub fn mean_std_dev(image: &Image) -> Vec<(f64, f64)> {
    let channels = image.channels() as usize;
    (0..channels)
        .into_par_iter()
        .map(|c| {
            mean_std(
                image
                    .as_raw()
                    .iter()
                    .skip(c)
                    .step_by(channels)
                    .map(|&v| v as f64),
            )
        })
        .collect()
}

pub fn float_mean_std_dev(image: &FloatImage) -> (f64, f64) {
    let n = image.as_slice().len() as f64;
    let mean = image.as_slice().par_iter().sum::<f64>() / n;
    let var = image
        .as_slice()
        .par_iter()
        .map(|v| (v - mean) * (v - mean))
        .sum::<f64>()
        / n;
    (mean, var.sqrt())
}

/// Population variance (squared standard deviation) of a response buffer.
pub fn variance(image: &FloatImage) -> f64 {
    let (_, std_dev) = float_mean_std_dev(image);
    std_dev * std_dev
}

/// Population variance of the first channel.
pub fn matrix_variance(image: &Image) -> f64 {
    let (_, std_dev) = mean_std(
        image
            .as_raw()
            .iter()
            .step_by(image.channels() as usize)
            .map(|&v| v as f64),
    );
    std_dev * std_dev
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_image_has_zero_spread() {
        let img = Image::filled(5, 4, &[7, 9]).unwrap();
        assert_eq!(mean_std_dev(&img), vec![(7.0, 0.0), (9.0, 0.0)]);
        assert_eq!(matrix_variance(&img), 0.0);
    }

    #[test]
    fn population_statistics() {
        let img = Image::from_raw(4, 1, 1, vec![2, 4, 4, 6]).unwrap();
        let stats = mean_std_dev(&img);
        assert_eq!(stats[0].0, 4.0);
        assert!((stats[0].1 - 2f64.sqrt()).abs() < 1e-12);
        assert!((matrix_variance(&img) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn float_variance_handles_signed_values() {
        let buf = FloatImage::from_raw(2, 2, vec![-4.0, 4.0, -4.0, 4.0]).unwrap();
        assert_eq!(float_mean_std_dev(&buf), (0.0, 4.0));
        assert_eq!(variance(&buf), 16.0);
    }
}
