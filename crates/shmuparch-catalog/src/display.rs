//! Compact rating strings for list rows and footers

use crate::{DifficultyScale, LogicalEntry, Routing};

impl LogicalEntry {
    /// Compact ratings such as `Q7 D5 R:M`. Difficulty derived from the
    /// Japanese index is marked with `~`.
    pub fn badges(&self) -> String {
        let def = self.definition();
        let mut parts = Vec::new();

        if let Some(q) = def.quality {
            parts.push(format!("Q{}", q));
        }

        if let (Some(rating), Some(unified)) = (def.primary_rating(), self.difficulty()) {
            match rating.scale {
                DifficultyScale::Western => parts.push(format!("D{}", unified)),
                DifficultyScale::Japanese => parts.push(format!("D~{}", unified)),
            }
        }

        if def.routing != Routing::Low || def.quality.is_some() {
            parts.push(format!("R:{}", def.routing.short_name()));
        }

        parts.join(" ")
    }

    /// `(available/total)` when the game has more than one variant
    pub fn variant_counter(&self) -> Option<String> {
        let total = self.variants().len();
        (total > 1).then(|| format!("({}/{})", self.available_count(), total))
    }

    /// Full rating breakdown for the footer
    pub fn rating_details(&self) -> String {
        let def = self.definition();
        let mut details = Vec::new();

        if let Some(q) = def.quality {
            details.push(format!("Quality: {}/10", q));
        }
        if let Some(d) = def.rating(DifficultyScale::Western) {
            details.push(format!("1CC Diff: {}/10", d));
        }
        if let Some(d) = def.rating(DifficultyScale::Japanese) {
            match &def.goal_jp {
                Some(goal) => details.push(format!("JP Diff: {}/45 ({})", d, goal)),
                None => details.push(format!("JP Diff: {}/45", d)),
            }
        }
        details.push(format!("Routing: {}", def.routing.display_name()));

        details.join(" | ")
    }
}
