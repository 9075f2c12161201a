use itertools::Itertools;

use crate::{Dfa, StateStatus, Symbol};

/// Trait that encapsulates the functionality of converting an object
/// into a [graphviz](https://graphviz.org/) representation.
pub trait ToDot {
    /// Compute the graphviz representation, for more information on the DOT format,
    /// see the [graphviz documentation](https://graphviz.org/doc/info/lang.html).
    fn dot_representation(&self) -> String {
        format!("digraph A {{\n{}\n{}\n}}\n", self.header(), self.body(""))
    }

    /// Graph level attributes.
    fn header(&self) -> String;

    /// Node and edge statements. Every node name is prefixed with `prefix`, which allows
    /// placing several objects into one graph.
    fn body(&self, prefix: &str) -> String;

    /// Renders the object visually (as PNG) and returns a vec of bytes/u8s encoding
    /// the rendered image. This method is only available on the `graphviz` crate feature
    /// and needs the `dot` executable on the path.
    #[cfg(feature = "graphviz")]
    fn render(&self) -> Result<Vec<u8>, std::io::Error> {
        use std::io::Write;

        let dot = self.dot_representation();
        let mut child = std::process::Command::new("dot")
            .arg("-Tpng")
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(dot.as_bytes())?;
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("dot process exited with status: {}", output.status),
            ));
        }
        Ok(output.stdout)
    }

    /// Renders the object to a PNG file with the given name, see [`ToDot::render`].
    #[cfg(feature = "graphviz")]
    fn render_to_file_name(&self, filename: &str) -> Result<(), std::io::Error> {
        tracing::trace!("Outputting dot and rendering to {filename}");
        std::fs::write(filename, self.render()?)
    }
}

impl<S: Symbol> ToDot for Dfa<S> {
    fn header(&self) -> String {
        [
            "fontname=\"Helvetica,Arial,sans-serif\"\nrankdir=LR".to_string(),
            "graph [ordering=\"out\"]".into(),
            "node [shape=circle]".into(),
        ]
        .join("\n")
    }

    fn body(&self, prefix: &str) -> String {
        let mut lines = vec![format!("\"{prefix},init\" [label=\"\", shape=none]")];

        for (id, state) in self.states().iter().enumerate() {
            let decoration = match state.status() {
                StateStatus::Accepting => ", peripheries=2",
                StateStatus::Rejecting => ", style=\"setlinewidth(3)\"",
                StateStatus::Unknown => "",
            };
            lines.push(format!("\"{prefix},{id}\" [label=\"q{id}\"{decoration}]"));
        }

        lines.push(format!(
            "\"{prefix},init\" -> \"{prefix},{}\" [style=\"solid\"]",
            self.starting_state()
        ));

        lines.extend(self.transitions().iter().map(|t| {
            format!(
                "\"{prefix},{}\" -> \"{prefix},{}\" [label = \"{}\"]",
                t.source(),
                t.target(),
                t.symbol().show()
            )
        }));
        lines.into_iter().join("\n")
    }
}

#[cfg(test)]
mod tests {
    use crate::{Dfa, StateStatus};

    use super::ToDot;

    #[test]
    fn dfa_to_dot() {
        let mut dfa = Dfa::new();
        let q0 = dfa.starting_state();
        let q1 = dfa.add_state(StateStatus::Accepting);
        let q2 = dfa.add_state(StateStatus::Rejecting);
        dfa.add_transition(q0, 'a', q1).unwrap();
        dfa.add_transition(q1, 'b', q2).unwrap();

        let dot = dfa.dot_representation();
        assert!(dot.starts_with("digraph A {\n"));
        assert!(dot.ends_with("}\n"));
        assert!(dot.contains("\",1\" [label=\"q1\", peripheries=2]"));
        assert!(dot.contains("\",2\" [label=\"q2\", style=\"setlinewidth(3)\"]"));
        assert!(dot.contains("\",init\" -> \",0\" [style=\"solid\"]"));
        assert!(dot.contains("\",0\" -> \",1\" [label = \"a\"]"));
        assert!(dot.contains("\",1\" -> \",2\" [label = \"b\"]"));
        assert!(dfa.body("x").contains("\"x,0\" [label=\"q0\"]"));
    }
}
