//! Demo training the angle-based classifier with both kernels

use rabc::api::AngleBasedClassifier;
use rabc::ColumnDataset;

fn three_rings() -> ColumnDataset {
    let mut x = Vec::new();
    let mut y = Vec::new();
    let mut category = Vec::new();
    let mut response = Vec::new();

    for class in 0..3 {
        let radius = 0.5 + class as f64;
        for step in 0..8 {
            let angle = step as f64 * std::f64::consts::PI / 4.0 + 0.2 * class as f64;
            x.push(radius * angle.cos());
            y.push(radius * angle.sin());
            category.push(class * 10);
            response.push(if step % 3 == 0 { -1.0 } else { 1.0 });
        }
    }

    let n = category.len();
    ColumnDataset::new(response, vec![1.0; n], category)
        .with_continuous(x)
        .with_continuous(y)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Angle-Based Classifier Demo ===");

    let data = three_rings();
    println!("Training samples: {}", data.response.len());

    for kernel in ["RBF 0.5", "RBF 2.0", "POLY 1.0 2"] {
        println!("\n--- Kernel {kernel} ---");
        let mut abc = AngleBasedClassifier::builder()
            .with_c(1.0)
            .with_kernel(kernel)
            .with_max_iterations(200)
            .build()?;

        let index = abc.add_dataset(data.clone());
        abc.bind(index)?;
        let report = abc.run()?.clone();

        let scores = abc.objective().alignment_scores(abc.parameters())?;
        let aligned = scores
            .iter()
            .zip(&data.response)
            .filter(|(u, r)| (**u > 0.0) == (**r > 0.0))
            .count();

        println!(
            "Status: {:?}, iterations: {}, objective: {:.6}",
            report.status, report.iterations, report.value
        );
        println!("Gradient norm: {:.3e}", report.gradient_norm);
        println!(
            "Samples on their target side: {}/{}",
            aligned,
            scores.len()
        );
    }

    Ok(())
}
