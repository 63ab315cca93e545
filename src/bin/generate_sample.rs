use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};

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

    /// Uniform integer in `0..bound`.
    fn below(&mut self, bound: u64) -> u64 {
        self.next_u64() % bound
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.below(items.len() as u64) as usize]
    }

    fn chance(&mut self, percent: u64) -> bool {
        self.below(100) < percent
    }
}

fn time_of_day(hour: u8) -> &'static str {
    match hour {
        5..=11 => "Morning",
        12..=16 => "Afternoon",
        17..=20 => "Evening",
        _ => "Night",
    }
}

fn duration_bin(minutes: i64) -> &'static str {
    match minutes {
        ..=30 => "Under 30 min",
        31..=90 => "30-90 min",
        _ => "Over 90 min",
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "sample_accidents.csv".to_string());
    let mut rng = SimpleRng::new(42);

    let cities: &[(&str, &[&str])] = &[
        ("CA", &["Los Angeles", "San Diego", "Sacramento"]),
        ("TX", &["Houston", "Dallas", "Austin"]),
        ("FL", &["Miami", "Orlando", "Tampa"]),
        ("NY", &["New York", "Buffalo", "Albany"]),
        ("WA", &["Seattle", "Spokane", "Tacoma"]),
    ];
    let temperatures = ["Freezing", "Cold", "Mild", "Warm", "Hot"];
    let precipitations = ["None", "Light", "Moderate", "Heavy"];
    let winds = ["Calm", "Breezy", "Windy", "Stormy"];
    let visibilities = ["Very Low", "Low", "Moderate", "High"];
    // Rush hours are drawn more often so the peak-hour metric has a clear
    // winner.
    let hours: &[u8] = &[
        0, 1, 2, 3, 4, 5, 6, 7, 8, 8, 8, 9, 9, 10, 11, 12, 13, 14, 15, 16, 17, 17, 17, 18, 18,
        19, 20, 21, 22, 23,
    ];

    let base = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();

    let mut writer = csv::Writer::from_path(&path)?;
    writer.write_record([
        "Start_Time",
        "End_Time",
        "State",
        "City",
        "Accident Day of Week",
        "Time of Day",
        "Duration_Bin",
        "Temperature_Ranges",
        "Precipitation_Ranges",
        "Wind_Speed_Bin",
        "Visibility_Ranges",
        "Accident_Hour",
        "Number_of_Traffic_Obstacles",
        "IsWeekend",
        "IsRushHour",
        "IsSevere",
    ])?;

    const ROWS: usize = 2_000;
    for _ in 0..ROWS {
        let (state, state_cities) = *rng.pick(cities);
        let city = *rng.pick(state_cities);

        let date = base + Duration::days(rng.below(180) as i64);
        let hour = *rng.pick(hours);
        let minute = rng.below(60) as u32;
        let start: NaiveDateTime = date
            .and_hms_opt(u32::from(hour), minute, 0)
            .expect("valid sample time");
        let duration_minutes = 5 + rng.below(175) as i64;
        let end = start + Duration::minutes(duration_minutes);

        let weekday = date.weekday();
        let is_weekend = matches!(weekday, Weekday::Sat | Weekday::Sun);
        let is_rush_hour = matches!(hour, 7..=9 | 16..=18);
        let is_severe = rng.chance(15);
        let obstacles = rng.below(9);

        writer.write_record([
            start.format("%Y-%m-%d %H:%M:%S").to_string(),
            end.format("%Y-%m-%d %H:%M:%S").to_string(),
            state.to_string(),
            city.to_string(),
            date.format("%A").to_string(),
            time_of_day(hour).to_string(),
            duration_bin(duration_minutes).to_string(),
            (*rng.pick(&temperatures)).to_string(),
            (*rng.pick(&precipitations)).to_string(),
            (*rng.pick(&winds)).to_string(),
            (*rng.pick(&visibilities)).to_string(),
            hour.to_string(),
            obstacles.to_string(),
            is_weekend.to_string(),
            is_rush_hour.to_string(),
            is_severe.to_string(),
        ])?;
    }
    writer.flush()?;

    println!("Wrote {ROWS} sample accident records to {path}");
    Ok(())
}
