mod test_concurrency;
mod test_event_recorder;
