/// Current UNIX time in milliseconds, 0 if the clock is before the epoch.
///
/// Used as the cache-busting parameter on order list requests.
pub fn current_timestamp_millis() -> u128 {
	std::time::SystemTime::now()
		.duration_since(std::time::UNIX_EPOCH)
		.map(|d| d.as_millis())
		.unwrap_or(0)
}
