use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use vellum_doc::{MarkSpec, NodeSpec, Schema};
use vellum_markdown::{tokenize, MarkdownParser, ParseSpec, ParserRules};

fn fixture() -> String {
    let mut out = String::new();
    for section in 0..20 {
        out.push_str(&format!("# Section {}\n\n", section));
        out.push_str("A paragraph with **bold**, *italic* and `code` runs.\n\n");
        out.push_str("- first item\n- second item\n- third item\n\n");
        out.push_str("> a quoted line\n\n");
    }
    out
}

fn schema() -> Arc<Schema> {
    let mut nodes = IndexMap::new();
    for (name, content) in [
        ("doc", Some("block+")),
        ("paragraph", Some("inline*")),
        ("heading", Some("inline*")),
        ("blockquote", Some("block+")),
        ("bullet_list", Some("list_item+")),
        ("list_item", Some("paragraph block*")),
        ("text", None),
    ] {
        nodes.insert(
            name.to_string(),
            NodeSpec {
                content: content.map(str::to_string),
                ..Default::default()
            },
        );
    }
    let mut marks = IndexMap::new();
    for name in ["strong", "em", "code_inline"] {
        marks.insert(name.to_string(), MarkSpec::default());
    }
    Arc::new(Schema::new(nodes, marks).unwrap())
}

fn parser() -> MarkdownParser {
    let mut specs = HashMap::new();
    for name in ["paragraph", "blockquote", "bullet_list", "list_item"] {
        specs.insert(name.to_string(), ParseSpec::block(name));
    }
    specs.insert(
        "heading".to_string(),
        ParseSpec::block("heading").with_attrs(|token| token.attrs.clone()),
    );
    for name in ["strong", "em", "code_inline"] {
        specs.insert(name.to_string(), ParseSpec::mark(name));
    }
    MarkdownParser::new(schema(), specs, ParserRules::new(), Vec::new())
}

fn bench_tokenize(c: &mut Criterion) {
    let input = fixture();
    c.bench_function("tokenize", |b| {
        b.iter(|| tokenize(black_box(&input), &ParserRules::new(), &[]))
    });
}

fn bench_parse(c: &mut Criterion) {
    let input = fixture();
    let parser = parser();
    c.bench_function("parse", |b| b.iter(|| parser.parse(black_box(&input)).unwrap()));
}

criterion_group!(benches, bench_tokenize, bench_parse);
criterion_main!(benches);
