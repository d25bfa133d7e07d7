mod cache_mock;

// Integration tests, one module per concern:
// - smoke_tests: config, component manager and actor handle basics
// - cache_mock: a mock key/value store behind the cache fallback
// - events_feed_mock: a local HTTP upstream serving the known payload shapes
// - rotation_tests: refresh scheduler driving the display under paused time
