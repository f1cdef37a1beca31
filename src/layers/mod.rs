/// Module for the LSTM cell.
pub mod lstm_cell;

/// Module for the dense output layer.
pub mod linear;
