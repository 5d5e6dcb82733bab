//! Line-oriented text persistence for models and bare weights.
//!
//! Full model files start with `DEEPC_MODEL_V2`, weights-only files with
//! `DEEPC_WEIGHTS_V2`. Every number is written like C's `%.17g`, which
//! round-trips an `f64` bit for bit.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use log::info;

use crate::activation::activation::Activation;
use crate::error::{NnError, Result};
use crate::layers::dense::Layer;
use crate::loss::LossType;
use crate::math::matrix::Matrix;
use crate::network::network::SequentialModel;
use crate::optim::OptimizerKind;

pub const MODEL_HEADER: &str = "DEEPC_MODEL_V2";
pub const WEIGHTS_HEADER: &str = "DEEPC_WEIGHTS_V2";

/// Formats `x` exactly like C's `printf("%.17g", x)`.
pub fn format_g17(x: f64) -> String {
    const PRECISION: i32 = 17;
    if x.is_nan() {
        return if x.is_sign_negative() { "-nan" } else { "nan" }.to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if x == 0.0 {
        return if x.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    let sci = format!("{:.*e}", (PRECISION - 1) as usize, x);
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return sci;
    };
    let exp: i32 = exp.parse().unwrap_or(0);
    if exp < -4 || exp >= PRECISION {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{sign}{:02}", trim_fraction(mantissa), exp.abs())
    } else {
        let fixed = format!("{:.*}", (PRECISION - 1 - exp) as usize, x);
        trim_fraction(&fixed).to_string()
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Writes the full model (architecture, training settings, parameters).
pub fn write_model<W: Write>(model: &SequentialModel, out: &mut W) -> Result<()> {
    check_single_line(model.name(), "model name")?;
    writeln!(out, "{MODEL_HEADER}")?;
    writeln!(out, "{}", model.name())?;
    writeln!(out, "{}", model.num_layers())?;
    writeln!(out, "{}", u8::from(model.is_compiled()))?;
    writeln!(out, "{}", model.optimizer_kind().code())?;
    writeln!(out, "{}", model.loss().code())?;
    writeln!(out, "{}", format_g17(model.learning_rate()))?;

    for layer in model.layers() {
        check_single_line(layer.name(), "layer name")?;
        writeln!(out, "LAYER_START")?;
        writeln!(out, "{}", layer.name())?;
        writeln!(out, "{}", layer.input_size())?;
        writeln!(out, "{}", layer.output_size())?;
        writeln!(out, "{}", layer.activation().code())?;
        write_block(out, "WEIGHTS", layer.weights())?;
        write_block(out, "BIASES", layer.biases())?;
        writeln!(out, "LAYER_END")?;
    }
    out.flush()?;
    Ok(())
}

/// Writes only the parameters, in layer order.
pub fn write_weights<W: Write>(model: &SequentialModel, out: &mut W) -> Result<()> {
    writeln!(out, "{WEIGHTS_HEADER}")?;
    writeln!(out, "{}", model.num_layers())?;
    for layer in model.layers() {
        write_block(out, "WEIGHTS", layer.weights())?;
        write_block(out, "BIASES", layer.biases())?;
    }
    out.flush()?;
    Ok(())
}

fn write_block<W: Write>(out: &mut W, tag: &str, m: &Matrix) -> Result<()> {
    writeln!(out, "{tag} {} {}", m.rows(), m.cols())?;
    for v in m.as_slice() {
        writeln!(out, "{}", format_g17(*v))?;
    }
    Ok(())
}

fn check_single_line(name: &str, what: &str) -> Result<()> {
    if name.contains('\n') || name.contains('\r') {
        return Err(NnError::InvalidConfig(format!("{what} must not contain line breaks")));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

struct LineReader<R> {
    lines: std::io::Lines<R>,
    line_no: usize,
}

impl<R: BufRead> LineReader<R> {
    fn new(reader: R) -> Self {
        LineReader { lines: reader.lines(), line_no: 0 }
    }

    fn next_line(&mut self, what: &str) -> Result<String> {
        self.line_no += 1;
        match self.lines.next() {
            Some(line) => Ok(line?),
            None => Err(NnError::format(format!(
                "unexpected end of file at line {} while reading {what}",
                self.line_no
            ))),
        }
    }

    fn parse<T: FromStr>(&mut self, what: &str) -> Result<T> {
        let line = self.next_line(what)?;
        line.trim().parse().map_err(|_| {
            NnError::format(format!("line {}: invalid {what} '{line}'", self.line_no))
        })
    }

    fn expect(&mut self, marker: &str) -> Result<()> {
        let line = self.next_line(marker)?;
        if line.trim_end() != marker {
            return Err(NnError::format(format!(
                "line {}: expected '{marker}', found '{line}'",
                self.line_no
            )));
        }
        Ok(())
    }

    /// Reads `TAG rows cols` followed by `rows * cols` values.
    fn block(&mut self, tag: &str) -> Result<Matrix> {
        let line = self.next_line(tag)?;
        let mut parts = line.split_whitespace();
        let dims = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(t), Some(r), Some(c), None) if t == tag => {
                r.parse::<usize>().ok().zip(c.parse::<usize>().ok())
            }
            _ => None,
        };
        let (rows, cols) = dims.ok_or_else(|| {
            NnError::format(format!(
                "line {}: expected '{tag} <rows> <cols>', found '{line}'",
                self.line_no
            ))
        })?;
        let count = rows.checked_mul(cols).ok_or_else(|| {
            NnError::format(format!("line {}: {tag} block {rows}x{cols} is too large", self.line_no))
        })?;
        let mut data = Vec::new();
        for _ in 0..count {
            data.push(self.parse::<f64>("parameter value")?);
        }
        Matrix::from_vec(rows, cols, data)
            .map_err(|e| NnError::format(format!("{tag} block: {e}")))
    }
}

/// Reads a model written by [`write_model`]. Compiled models get fresh
/// optimizer state; Adam moments are not part of the file.
pub fn read_model<R: BufRead>(reader: R) -> Result<SequentialModel> {
    let mut input = LineReader::new(reader);
    if input.next_line("header")?.trim_end() != MODEL_HEADER {
        return Err(NnError::format("invalid model file header"));
    }

    let name = input.next_line("model name")?;
    let num_layers: usize = input.parse("layer count")?;
    let is_compiled = match input.parse::<i32>("compiled flag")? {
        0 => false,
        1 => true,
        other => return Err(NnError::format(format!("invalid compiled flag {other}"))),
    };
    let optimizer = OptimizerKind::from_code(input.parse("optimizer code")?)?;
    let loss = LossType::from_code(input.parse("loss code")?)?;
    let learning_rate: f64 = input.parse("learning rate")?;

    let mut model = SequentialModel::new(name);
    for index in 0..num_layers {
        input.expect("LAYER_START")?;
        let layer_name = input.next_line("layer name")?;
        let input_size: usize = input.parse("input size")?;
        let output_size: usize = input.parse("output size")?;
        let activation = Activation::from_code(input.parse("activation code")?)?;
        let weights = input.block("WEIGHTS")?;
        let biases = input.block("BIASES")?;
        input.expect("LAYER_END")?;

        if weights.shape() != (output_size, input_size) || biases.shape() != (output_size, 1) {
            return Err(NnError::format(format!(
                "layer {index}: parameter blocks do not match {input_size} -> {output_size}"
            )));
        }
        let layer = Layer::from_parameters(weights, biases, activation)?.with_name(layer_name);
        model.add(layer)?;
    }

    if is_compiled {
        model.compile(optimizer, loss, learning_rate)?;
    } else {
        model.set_training_settings(optimizer, loss, learning_rate);
    }
    Ok(model)
}

/// Parses a weights file and installs it into `model`. Nothing is modified
/// unless the layer count and every block shape match.
pub fn read_weights_into<R: BufRead>(model: &mut SequentialModel, reader: R) -> Result<()> {
    let mut input = LineReader::new(reader);
    if input.next_line("header")?.trim_end() != WEIGHTS_HEADER {
        return Err(NnError::format("invalid weights file header"));
    }
    let num_layers: usize = input.parse("layer count")?;
    if num_layers != model.num_layers() {
        return Err(NnError::dims(format!(
            "layer count mismatch: model has {}, file has {num_layers}",
            model.num_layers()
        )));
    }

    let mut params = Vec::with_capacity(num_layers);
    for (index, layer) in model.layers().iter().enumerate() {
        let weights = input.block("WEIGHTS")?;
        if weights.shape() != layer.weights().shape() {
            return Err(NnError::dims(format!("weights dimension mismatch in layer {index}")));
        }
        let biases = input.block("BIASES")?;
        if biases.shape() != layer.biases().shape() {
            return Err(NnError::dims(format!("biases dimension mismatch in layer {index}")));
        }
        params.push((weights, biases));
    }

    for (layer, (weights, biases)) in model.layers_mut().iter_mut().zip(params) {
        layer.set_parameters(weights, biases)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// File helpers
// ---------------------------------------------------------------------------

impl SequentialModel {
    pub fn save_model(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        write_model(self, &mut writer)?;
        info!("model saved: {}", path.display());
        Ok(())
    }

    pub fn load_model(path: impl AsRef<Path>) -> Result<SequentialModel> {
        let path = path.as_ref();
        let model = read_model(BufReader::new(File::open(path)?))?;
        info!(
            "model loaded: {} ('{}', {} layers)",
            path.display(),
            model.name(),
            model.num_layers()
        );
        Ok(model)
    }

    pub fn save_weights(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        write_weights(self, &mut writer)?;
        info!("weights saved: {}", path.display());
        Ok(())
    }

    pub fn load_weights(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        read_weights_into(self, BufReader::new(File::open(path)?))?;
        info!("weights loaded: {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn g17_matches_printf() {
        assert_eq!(format_g17(0.0), "0");
        assert_eq!(format_g17(-0.0), "-0");
        assert_eq!(format_g17(1.0), "1");
        assert_eq!(format_g17(-2.5), "-2.5");
        assert_eq!(format_g17(0.1), "0.10000000000000001");
        assert_eq!(format_g17(0.01), "0.01");
        assert_eq!(format_g17(1e-5), "1.0000000000000001e-05");
        assert_eq!(format_g17(1e20), "1e+20");
        assert_eq!(format_g17(123456789.0), "123456789");
        assert_eq!(format_g17(1e16), "10000000000000000");
        assert_eq!(format_g17(1e17), "1e+17");
        assert_eq!(format_g17(0.0001), "0.0001");
        assert_eq!(format_g17(f64::INFINITY), "inf");
        assert_eq!(format_g17(f64::NEG_INFINITY), "-inf");
    }

    #[test]
    fn g17_round_trips_bits() {
        for x in [std::f64::consts::PI, -1.0 / 3.0, 6.02214076e23, 5e-324, f64::MAX, 0.3] {
            let back: f64 = format_g17(x).parse().unwrap();
            assert_eq!(back.to_bits(), x.to_bits());
        }
    }

    #[test]
    fn truncated_model_is_a_format_error() {
        let text = "DEEPC_MODEL_V2\nm\n1\n0\n0\n0\n0.01\nLAYER_START\ndense\n2\n";
        assert!(matches!(read_model(text.as_bytes()), Err(NnError::FileFormat(_))));
    }

    #[test]
    fn wrong_header_is_a_format_error() {
        assert!(matches!(read_model("DEEPC_MODEL_V1\n".as_bytes()), Err(NnError::FileFormat(_))));
        assert!(matches!(read_model("".as_bytes()), Err(NnError::FileFormat(_))));
    }
}
