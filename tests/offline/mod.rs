mod go_offline_in_simple_mode;
mod go_offline_twice_fails;
mod go_offline_with_tracking_mode;
