//! Terminal and file output for statistics and leaderboards.

use anyhow::Result;
use std::path::Path;

use duelrank_core::domain::{ItemRating, TournamentConfig};
use duelrank_core::TournamentStatistics;

pub fn print_statistics(config: &TournamentConfig, stats: &TournamentStatistics) {
    println!("tournament {} — {}", config.id, config.title);
    if stats.threshold.is_finite() {
        println!("  threshold        {:>10.1}", stats.threshold);
    } else {
        println!("  threshold        none (fewer than {} qualified)", config.top_n);
    }
    println!("  above threshold  {:>10}", stats.above_threshold);
    println!("  unqualified      {:>10}", stats.unqualified);
    println!("  total matches    {:>10}", stats.total_matches);
    println!("  total wins       {:>10}", stats.total_wins);
    println!("  selector retries {:>10}", stats.retries);

    if !stats.distribution.is_empty() {
        let peak = stats.distribution.values().copied().max().unwrap_or(1);
        println!("  rating distribution:");
        for (bin, count) in &stats.distribution {
            let bar = "#".repeat((count * 40).div_ceil(peak));
            println!("    {bin:>6} | {bar} {count}");
        }
    }
}

pub fn print_leaderboard(items: &[ItemRating]) {
    println!("{:>4}  {:>8}  {:>8}  {:>7}  {:>5}  {:>6}", "rank", "item", "rating", "matches", "wins", "win%");
    for (rank, record) in items.iter().enumerate() {
        println!(
            "{:>4}  {:>8}  {:>8.1}  {:>7}  {:>5}  {:>5.1}%",
            rank + 1,
            record.item,
            record.rating,
            record.matches,
            record.wins,
            record.win_rate() * 100.0
        );
    }
}

pub fn write_csv(path: &Path, items: &[ItemRating]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["rank", "item", "rating", "matches", "wins", "win_rate"])?;
    for (rank, record) in items.iter().enumerate() {
        writer.write_record([
            (rank + 1).to_string(),
            record.item.to_string(),
            format!("{:.2}", record.rating),
            record.matches.to_string(),
            record.wins.to_string(),
            format!("{:.4}", record.win_rate()),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use duelrank_core::domain::ItemId;

    #[test]
    fn csv_export_includes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("top.csv");

        let mut a = ItemRating::with_rating(ItemId(1), 1650.0);
        a.matches = 10;
        a.wins = 7;
        let b = ItemRating::with_rating(ItemId(2), 1500.0);
        write_csv(&path, &[a, b]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "rank,item,rating,matches,wins,win_rate");
        assert!(lines[1].starts_with("1,1,1650.00,10,7"));
    }
}
