use stonerandom::{fingerprint_salt, seed, XorShift32};

// Prints the Gaussian pairs a cell would draw, for eyeballing jitter spread.
// Usage: dump_gaussian [x] [y] [move] [fingerprint] [count]
fn main() {
    let args: Vec<String> = std::env::args().collect();

    let x: i64 = args.get(1).and_then(|a| a.parse().ok()).unwrap_or(3);
    let y: i64 = args.get(2).and_then(|a| a.parse().ok()).unwrap_or(3);
    let move_index: i64 = args.get(3).and_then(|a| a.parse().ok()).unwrap_or(1);
    let fingerprint = args.get(4).map(String::as_str).unwrap_or("");
    let count: usize = args.get(5).and_then(|a| a.parse().ok()).unwrap_or(10);

    let cell_seed = seed(x, y, move_index, fingerprint_salt(fingerprint));
    println!("seed {}", cell_seed);

    let mut rng = XorShift32::from_seed(cell_seed);
    for _ in 0..count {
        let (a, b) = rng.next_gaussian_pair();
        println!("{:+.6} {:+.6}", a, b);
    }
}
