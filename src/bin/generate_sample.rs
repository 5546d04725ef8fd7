use chrono::{Datelike, NaiveDate};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// (label, typical daily count, typical fine per challan)
const VIOLATIONS: &[(&str, f64, f64)] = &[
    ("Speeding", 42.0, 1000.0),
    ("Signal Jump", 28.0, 500.0),
    ("No Helmet", 55.0, 300.0),
    ("Wrong Parking", 35.0, 200.0),
    ("Drunk Driving", 6.0, 10000.0),
    ("No Seatbelt", 18.0, 500.0),
];

fn main() {
    let mut rng = SimpleRng::new(42);

    let start = NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid start date");
    let days: u64 = 120;

    let mut writer = csv::Writer::from_path("echallan_daily_data.csv")
        .expect("creating echallan_daily_data.csv");

    // Headers are deliberately un-normalized; the loader cleans them up.
    writer
        .write_record(["Date", "Violation Type", "Challan Count", "Total Amount"])
        .expect("writing header");

    let mut rows = 0usize;
    for day in 0..days {
        let date = start + chrono::Days::new(day);
        // Weekends see more traffic enforcement.
        let weekend_boost = if date.weekday().num_days_from_monday() >= 5 {
            1.3
        } else {
            1.0
        };

        for &(label, typical_count, fine) in VIOLATIONS {
            let count = rng
                .gauss(typical_count * weekend_boost, typical_count * 0.25)
                .round()
                .max(0.0) as i64;
            let amount = count as f64 * fine * rng.gauss(1.0, 0.05).max(0.5);

            writer
                .write_record([
                    date.format("%Y-%m-%d").to_string(),
                    label.to_string(),
                    count.to_string(),
                    format!("{amount:.2}"),
                ])
                .expect("writing row");
            rows += 1;
        }
    }

    writer.flush().expect("flushing CSV");
    println!("Wrote echallan_daily_data.csv ({rows} rows over {days} days)");
}
