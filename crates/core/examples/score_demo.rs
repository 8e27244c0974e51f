//! Demo: score a synthetic practice attempt end to end.
//!
//! Run with: cargo run -p sauti-core --example score_demo

use sauti_core::audio::features::AudioFeatures;
use sauti_core::scoring;

fn main() {
    println!("=== Sauti scoring demo ===\n");

    // 1. Synthesize a half-second 220 Hz "recording" at 16 kHz
    let sample_rate = 16000u32;
    let samples: Vec<f64> = (0..8000)
        .map(|i| {
            (2.0 * std::f64::consts::PI * 220.0 * i as f64 / sample_rate as f64).sin() * 0.4
        })
        .collect();
    println!(
        "1. Synthesized {} samples at {} Hz",
        samples.len(),
        sample_rate
    );

    // 2. Signal features on their own
    let features = AudioFeatures::extract(&samples, sample_rate).expect("feature extraction");
    println!("2. Signal features:");
    println!("   energy: {:.6}", features.energy);
    println!("   zcr:    {:.6}", features.zero_crossing_rate);
    println!("   snr:    {:.2} dB", features.snr_db);
    println!(
        "   pitch:  {:.2} Hz (std {:.2})",
        features.mean_pitch, features.pitch_std
    );

    // 3. Score a close-but-not-perfect attempt
    let reference = "the quick brown fox jumps over the lazy dog";
    let heard = "the quick brown fox jumps over the dog";
    let score = scoring::score(reference, heard, &samples, sample_rate).expect("scoring");

    println!("\n3. Reference: {}", reference);
    println!("   Heard:     {}", heard);
    println!("{}", serde_json::to_string_pretty(&score).expect("serialize"));
    println!("\nVerdict: {}", score.verdict());
}
