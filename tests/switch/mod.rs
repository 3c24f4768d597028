mod switch_between_branches;
mod switch_tracking_patterns_only;
