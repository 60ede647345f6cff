pub(crate) mod aggregator;
