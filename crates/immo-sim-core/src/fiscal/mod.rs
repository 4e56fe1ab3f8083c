pub mod regimes;
