//! Dashboard aggregation over a user's reviews.
//!
//! Pure functions: summary statistics, the "best current rating per
//! restaurant" ranking for the chart, and the rating-to-color bucketing the
//! bars use. Everything here is deterministic over its input order; the
//! ranking preserves first-seen order for ties so re-renders are stable.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::models::{FavoriteEntry, Review};

/// The chart never shows more than this many restaurants.
pub const TOP_RESTAURANT_LIMIT: usize = 8;
/// Display names longer than this are truncated with a trailing ellipsis.
pub const NAME_DISPLAY_LIMIT: usize = 15;

pub const COLOR_EXCELLENT: &str = "#d35400"; // rating >= 4.5
pub const COLOR_GREAT: &str = "#f1c40f"; // rating >= 3.5
pub const COLOR_GOOD: &str = "#f39c12"; // rating >= 2.5
pub const COLOR_FAIR: &str = "#e67e22"; // everything below

/// One bar of the dashboard chart.
#[derive(Debug, Clone, PartialEq)]
pub struct RestaurantRating {
    /// Truncated name used as the axis label.
    pub restaurant: String,
    /// Untruncated name for tooltips.
    pub full_name: String,
    pub rating: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSummary {
    pub total_reviews: usize,
    pub average_rating: f64,
    pub unique_restaurants: usize,
    pub top_restaurants: Vec<RestaurantRating>,
}

impl DashboardSummary {
    /// One-decimal display form of the average ("0.0", "4.2").
    pub fn average_label(&self) -> String {
        one_decimal(self.average_rating)
    }
}

/// Counts shown on the favorites page header.
#[derive(Debug, Clone, PartialEq)]
pub struct FavoritesSummary {
    pub total: usize,
    pub unique_restaurants: usize,
    pub average_rating: f64,
}

impl FavoritesSummary {
    pub fn average_label(&self) -> String {
        one_decimal(self.average_rating)
    }
}

pub fn summarize(reviews: &[Review]) -> DashboardSummary {
    DashboardSummary {
        total_reviews: reviews.len(),
        average_rating: mean_rating(reviews.iter().map(|review| review.rating)),
        unique_restaurants: reviews
            .iter()
            .map(|review| review.restaurant_name.as_str())
            .collect::<HashSet<_>>()
            .len(),
        top_restaurants: top_restaurants(reviews),
    }
}

/// For each distinct restaurant, the rating of the latest-dated review for
/// it (recency wins, not rating value; equal timestamps keep the first
/// seen). Ranked descending by rating and capped at [`TOP_RESTAURANT_LIMIT`].
pub fn top_restaurants(reviews: &[Review]) -> Vec<RestaurantRating> {
    // Vec instead of a map keeps first-seen order deterministic for ties.
    let mut latest: Vec<(String, f64, DateTime<Utc>)> = Vec::new();
    for review in reviews {
        match latest
            .iter_mut()
            .find(|(name, _, _)| *name == review.restaurant_name)
        {
            Some(entry) => {
                if entry.2 < review.created_at {
                    entry.1 = review.rating;
                    entry.2 = review.created_at;
                }
            }
            None => latest.push((
                review.restaurant_name.clone(),
                review.rating,
                review.created_at,
            )),
        }
    }

    let mut ranked: Vec<RestaurantRating> = latest
        .into_iter()
        .map(|(name, rating, _)| RestaurantRating {
            restaurant: display_name(&name),
            full_name: name,
            rating,
        })
        .collect();
    ranked.sort_by(|a, b| b.rating.total_cmp(&a.rating));
    ranked.truncate(TOP_RESTAURANT_LIMIT);
    ranked
}

/// Chart bar color bucket for a rating.
pub fn bar_color(rating: f64) -> &'static str {
    if rating >= 4.5 {
        COLOR_EXCELLENT
    } else if rating >= 3.5 {
        COLOR_GREAT
    } else if rating >= 2.5 {
        COLOR_GOOD
    } else {
        COLOR_FAIR
    }
}

/// The most recent reviews in server order, for the dashboard side panel.
pub fn recent_reviews(reviews: &[Review], count: usize) -> &[Review] {
    &reviews[..count.min(reviews.len())]
}

pub fn summarize_favorites(entries: &[FavoriteEntry]) -> FavoritesSummary {
    FavoritesSummary {
        total: entries.len(),
        unique_restaurants: entries
            .iter()
            .map(|entry| entry.restaurant_name.as_str())
            .collect::<HashSet<_>>()
            .len(),
        average_rating: mean_rating(entries.iter().map(|entry| entry.rating)),
    }
}

fn mean_rating(ratings: impl ExactSizeIterator<Item = f64>) -> f64 {
    let count = ratings.len();
    if count == 0 {
        return 0.0;
    }
    round_one_decimal(ratings.sum::<f64>() / count as f64)
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn one_decimal(value: f64) -> String {
    format!("{value:.1}")
}

fn display_name(name: &str) -> String {
    if name.chars().count() > NAME_DISPLAY_LIMIT {
        let truncated: String = name.chars().take(NAME_DISPLAY_LIMIT).collect();
        format!("{truncated}...")
    } else {
        name.to_string()
    }
}
