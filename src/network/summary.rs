use std::fmt;

use crate::network::network::SequentialModel;

impl fmt::Display for SequentialModel {
    /// Human-readable summary: settings, one line per layer, parameter total.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Model Summary: {} ===", self.name())?;
        writeln!(f, "Layers: {}", self.num_layers())?;
        if self.is_compiled() {
            writeln!(f, "Compiled: Yes")?;
            writeln!(f, "Optimizer: {}", self.optimizer_kind())?;
            writeln!(f, "Loss: {}", self.loss())?;
            writeln!(f, "Learning rate: {:.4}", self.learning_rate())?;
        } else {
            writeln!(f, "Compiled: No")?;
        }
        writeln!(f, "-------------------------------------------------")?;
        for (i, layer) in self.layers().iter().enumerate() {
            writeln!(
                f,
                "Layer {}: Dense({} -> {}) {} - Params: {}",
                i + 1,
                layer.input_size(),
                layer.output_size(),
                layer.activation(),
                layer.parameter_count()
            )?;
        }
        writeln!(f, "-------------------------------------------------")?;
        write!(f, "Total parameters: {}", self.parameter_count())
    }
}
