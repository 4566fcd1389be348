pub mod alliance;

pub mod bundles;

pub mod match_timing;

pub mod messages;
