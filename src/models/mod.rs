/// Module for stacked LSTM networks.
pub mod lstm_network;

/// Module for the sequence-to-value regressor built on the LSTM stack.
pub mod regressor;
