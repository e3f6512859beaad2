use super::node::NodeRef;

#[derive(Default)]
struct Block {
    lines: Vec<String>,
    /// Column of the label's center.
    pos: usize,
    width: usize,
}

pub fn render<V, C>(root: Option<NodeRef<'_, V, C>>) -> String {
    root.map(|root| layout(root).lines.join("\n"))
        .unwrap_or_default()
}

fn layout<V, C>(node: NodeRef<'_, V, C>) -> Block {
    let mut label = node.key().to_string();
    let mut left = node.left().map(layout).unwrap_or_default();
    let mut right = node.right().map(layout).unwrap_or_default();

    let middle = (right.pos + left.width + 1 - left.pos)
        .max(label.len())
        .max(2);
    let pos = left.pos + middle / 2;
    let width = left.pos + middle + right.width - right.pos;

    let depth = left.lines.len().max(right.lines.len());
    left.lines.resize(depth, " ".repeat(left.width));
    right.lines.resize(depth, " ".repeat(right.width));

    // a left child leans its spare column toward its parent
    if (middle - label.len()) % 2 == 1 && node.is_left_child() && label.len() < middle {
        label.push('.');
    }
    let lead = (middle - label.len()) / 2;
    let mut label = format!("{}{label}", ".".repeat(lead));
    while label.len() < middle {
        label.push('.');
    }
    if label.starts_with('.') {
        label.replace_range(..1, " ");
    }
    if label.ends_with('.') {
        let end = label.len();
        label.replace_range(end - 1.., " ");
    }

    let indent = " ".repeat(left.pos);
    let tail = " ".repeat(right.width - right.pos);
    let gap = " ".repeat(width - left.width - right.width);

    let mut lines = vec![
        format!("{indent}{label}{tail}"),
        format!("{indent}/{}\\{tail}", " ".repeat(middle - 2)),
    ];
    lines.extend(
        left.lines
            .iter()
            .zip(&right.lines)
            .map(|(left_line, right_line)| format!("{left_line}{gap}{right_line}")),
    );

    Block { lines, pos, width }
}
