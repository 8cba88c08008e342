use mdquery::{
    Branch, DecodeError, Error, FindError, FindOptions, Matcher, StringList, decode, find,
    find_all, find_all_with_options, find_with_options, query_all, query_children, query_one,
    unmarshal,
};
use mdtree::{
    KindTag, NodeKind, ParseOptions, ParsedDocument, Parser, build_tree, render_to_string,
};
use rstest::{fixture, rstest};
use serde::Deserialize;

const SIMPLE: &str = "# Title

## Subheading

- item one #tag1
- item two #tag2

Some text #tag3

## Other

### Sub-subheading

more
";

const RECIPE: &str = "
# My Recipe

Here's a long story about making dinner.

## Tags

#dinner #chicken

## Ingredients

- Chicken
- Vegetables
- Salt
- Pepper

## Comments

| Name      | Comment    |
| --------- | ---------- |
| Alice     | It's good! |
| Bob       | It's bad   |
";

fn parse(text: &str) -> ParsedDocument {
    Parser::default().parse(text).expect("parse failed")
}

#[fixture]
fn simple() -> ParsedDocument {
    parse(SIMPLE)
}

#[fixture]
fn recipe() -> ParsedDocument {
    parse(RECIPE)
}

fn title_and_sub() -> Vec<Matcher> {
    vec![
        Matcher::branch(1, "Title"),
        Matcher::branch(2, "Subheading"),
    ]
}

#[rstest]
#[case::missing_heading(
    vec![
        Matcher::branch(1, "Title"),
        Matcher::branch(2, "Subheading"),
        Matcher::branch(3, "Not Real"),
    ],
    "failed to match query: document[# Title][## Subheading] did not have a [### Not Real]"
)]
#[case::wrong_level(
    vec![Matcher::branch(1, "Title"), Matcher::branch(3, "Subheading")],
    "failed to match query: document[# Title] did not have a [### Subheading]"
)]
#[case::nested_list(
    vec![
        Matcher::branch(1, "Title"),
        Matcher::branch(2, "Subheading"),
        Matcher::List,
        Matcher::List,
    ],
    "failed to match query: document[# Title][## Subheading].list did not have a .list"
)]
#[case::index_out_of_range(
    vec![
        Matcher::branch(1, "Title"),
        Matcher::branch(2, "Subheading"),
        Matcher::List,
        Matcher::index(4, Matcher::AnyNode),
    ],
    "failed to match query: document[# Title][## Subheading].list did not have a [4].any"
)]
fn failed_query_reports_path(
    simple: ParsedDocument,
    #[case] matchers: Vec<Matcher>,
    #[case] expected: &str,
) {
    let doc = &simple.document;
    let err = query_one(doc, doc.root(), &simple.source, &matchers).unwrap_err();
    assert!(err.is_no_match());
    assert_eq!(err.to_string(), expected);
}

#[rstest]
fn query_error_carries_matched_segments(simple: ParsedDocument) {
    let doc = &simple.document;
    let mut matchers = title_and_sub();
    matchers.push(Matcher::branch(3, "Not Real"));

    let Err(Error::NoMatch(err)) = query_one(doc, doc.root(), &simple.source, &matchers) else {
        panic!("expected a no-match error");
    };
    assert_eq!(err.matches(), &matchers[..2]);
    assert_eq!(err.failed(), &matchers[2]);
}

#[rstest]
fn deeper_heading_is_found(simple: ParsedDocument) {
    let doc = &simple.document;
    let node = query_one(
        doc,
        doc.root(),
        &simple.source,
        &[Matcher::branch(1, "Title"), Matcher::branch(3, "Sub-subheading")],
    )
    .unwrap();

    assert!(matches!(doc.kind(node), NodeKind::Heading { level: 3 }));
    assert_eq!(doc.text(node, &simple.source), "Sub-subheading");
}

#[rstest]
fn query_is_repeatable(simple: ParsedDocument) {
    let doc = &simple.document;
    let mut matchers = title_and_sub();
    matchers.push(Matcher::List);

    let first = query_one(doc, doc.root(), &simple.source, &matchers).unwrap();
    let second = query_one(doc, doc.root(), &simple.source, &matchers).unwrap();
    assert_eq!(first, second);
}

#[rstest]
fn query_all_collects_tags_in_scope(simple: ParsedDocument) {
    let doc = &simple.document;
    let tags = query_all(doc, doc.root(), &simple.source, &title_and_sub(), &Matcher::Tag)
        .unwrap();

    let names: Vec<_> = tags
        .iter()
        .map(|&tag| decode::tag(doc, tag, &simple.source).unwrap())
        .collect();
    assert_eq!(names, vec!["tag1", "tag2", "tag3"]);
}

#[rstest]
fn query_all_without_matchers_searches_everything(simple: ParsedDocument) {
    let doc = &simple.document;
    let tags = query_all(doc, doc.root(), &simple.source, &[], &Matcher::Tag).unwrap();
    assert_eq!(tags.len(), 3);
}

#[test]
fn query_all_stops_at_closing_heading() {
    let parsed = parse("# A\n\n#in\n\n## B\n\n#nested\n\n# C\n\n#out\n");
    let doc = &parsed.document;

    let tags = find_all(
        doc,
        doc.root(),
        &parsed.source,
        &[Matcher::branch(1, "A")],
        &Matcher::Tag,
        decode::tag,
    )
    .unwrap();
    assert_eq!(tags, vec!["in", "nested"]);
}

#[test]
fn query_all_with_no_matches_is_empty() {
    let parsed = parse("# A\n\nNo tags here.\n");
    let doc = &parsed.document;

    let tags = query_all(
        doc,
        doc.root(),
        &parsed.source,
        &[Matcher::branch(1, "A")],
        &Matcher::Tag,
    )
    .unwrap();
    assert!(tags.is_empty());
}

#[test]
fn branch_scope_hides_later_lists() {
    let parsed = parse("## Ingredients\n\nNone yet.\n\n## Steps\n\n- boil\n");
    let doc = &parsed.document;

    let err = query_one(
        doc,
        doc.root(),
        &parsed.source,
        &[Matcher::branch(2, "Ingredients"), Matcher::List],
    )
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "failed to match query: document[## Ingredients] did not have a .list"
    );
}

#[test]
fn index_selects_second_list() {
    let parsed = parse("## Lists\n\n- a\n\n* b\n");
    let doc = &parsed.document;

    let items = find(
        doc,
        doc.root(),
        &parsed.source,
        &[Matcher::branch(2, "Lists"), Matcher::index(1, Matcher::List)],
        decode::list_items,
    )
    .unwrap();
    assert_eq!(items, vec!["b"]);
}

#[test]
fn node_of_kind_descends_into_children() {
    let parsed = parse("Intro with a [link](https://example.com).\n");
    let doc = &parsed.document;

    let link = query_one(
        doc,
        doc.root(),
        &parsed.source,
        &[
            Matcher::NodeOfKind(KindTag::Paragraph),
            Matcher::NodeOfKind(KindTag::Link),
        ],
    )
    .unwrap();
    let NodeKind::Link { destination, .. } = doc.kind(link) else {
        panic!("expected a link");
    };
    assert_eq!(destination, "https://example.com");
    assert_eq!(doc.text(link, &parsed.source), "link");
}

#[test]
fn case_insensitive_branch() {
    let parsed = parse(RECIPE);
    let doc = &parsed.document;

    let items = find(
        doc,
        doc.root(),
        &parsed.source,
        &[
            Branch::new(2, "INGREDIENTS").case_insensitive().into(),
            Matcher::List,
        ],
        decode::list_items,
    )
    .unwrap();
    assert_eq!(items.len(), 4);
}

#[rstest]
fn tree_mode_matches_branch_nodes(mut simple: ParsedDocument) {
    let root = build_tree(&mut simple.document);
    let doc = &simple.document;

    let mut matchers = title_and_sub();
    matchers.push(Matcher::List);
    let items = find(doc, root, &simple.source, &matchers, decode::list_items).unwrap();
    assert_eq!(items, vec!["item one #tag1", "item two #tag2"]);

    let tags = query_all(doc, root, &simple.source, &title_and_sub(), &Matcher::Tag).unwrap();
    assert_eq!(tags.len(), 3);
}

#[rstest]
fn tree_mode_reports_same_failure(mut simple: ParsedDocument) {
    let root = build_tree(&mut simple.document);
    let doc = &simple.document;

    let mut matchers = title_and_sub();
    matchers.push(Matcher::branch(3, "Not Real"));
    let err = query_one(doc, root, &simple.source, &matchers).unwrap_err();
    assert_eq!(
        err.to_string(),
        "failed to match query: document[# Title][## Subheading] did not have a [### Not Real]"
    );
}

#[test]
fn tree_mode_does_not_descend_into_nested_branches() {
    let text = "# A\n\n## B\n\n- x\n";
    let matchers = [Matcher::branch(1, "A"), Matcher::List];

    let flat = Parser::default().parse(text).unwrap();
    let list = query_one(&flat.document, flat.document.root(), &flat.source, &matchers).unwrap();
    assert!(matches!(flat.document.kind(list), NodeKind::List { .. }));

    let mut tree = Parser::default().parse(text).unwrap();
    let root = build_tree(&mut tree.document);
    let err = query_one(&tree.document, root, &tree.source, &matchers).unwrap_err();
    assert_eq!(
        err.to_string(),
        "failed to match query: document[# A] did not have a .list"
    );

    let lists = query_all(
        &tree.document,
        root,
        &tree.source,
        &matchers[..1],
        &Matcher::List,
    )
    .unwrap();
    assert_eq!(lists.len(), 1);
    let lists = query_all(
        &flat.document,
        flat.document.root(),
        &flat.source,
        &matchers[..1],
        &Matcher::List,
    )
    .unwrap();
    assert_eq!(lists.len(), 1);
}

#[rstest]
fn recipe_ingredients(recipe: ParsedDocument) {
    let doc = &recipe.document;
    let ingredients = find(
        doc,
        doc.root(),
        &recipe.source,
        &[
            Branch::level(1).into(),
            Matcher::branch(2, "Ingredients"),
            Matcher::index(0, Matcher::List),
        ],
        decode::list_items,
    )
    .unwrap();
    assert_eq!(ingredients, vec!["Chicken", "Vegetables", "Salt", "Pepper"]);
}

#[rstest]
fn recipe_tags(recipe: ParsedDocument) {
    let doc = &recipe.document;
    let tags = find_all(
        doc,
        doc.root(),
        &recipe.source,
        &[Matcher::branch(2, "Tags")],
        &Matcher::Tag,
        decode::tag,
    )
    .unwrap();
    assert_eq!(tags, vec!["dinner", "chicken"]);
}

#[rstest]
fn recipe_comments(recipe: ParsedDocument) {
    let doc = &recipe.document;
    let rows = find(
        doc,
        doc.root(),
        &recipe.source,
        &[Matcher::branch(2, "Comments"), Matcher::Table],
        decode::table_to_map,
    )
    .unwrap();

    let pairs: Vec<_> = rows
        .iter()
        .map(|row| (row["Name"].as_str(), row["Comment"].as_str()))
        .collect();
    assert_eq!(pairs, vec![("Alice", "It's good!"), ("Bob", "It's bad")]);
}

#[test]
fn blank_headers_use_column_index() {
    let parsed = parse("|   |   |\n|---|---|\n| x | y |\n");
    let doc = &parsed.document;

    let rows = find(
        doc,
        doc.root(),
        &parsed.source,
        &[Matcher::Table],
        decode::table_to_map,
    )
    .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["0"], "x");
    assert_eq!(rows[0]["1"], "y");
}

#[rstest]
fn missing_section_can_be_allowed(recipe: ParsedDocument) {
    let doc = &recipe.document;
    let query = [Matcher::branch(2, "Steps"), Matcher::List];

    let err = find(doc, doc.root(), &recipe.source, &query, decode::list_items).unwrap_err();
    assert!(matches!(err, FindError::Query(Error::NoMatch(_))));

    let steps = find_with_options(
        doc,
        doc.root(),
        &recipe.source,
        &query,
        decode::list_items,
        FindOptions::default().allow_no_match(),
    )
    .unwrap();
    assert_eq!(steps, None);

    let tags = find_all_with_options(
        doc,
        doc.root(),
        &recipe.source,
        &[Matcher::branch(2, "Keywords")],
        &Matcher::Tag,
        decode::tag,
        FindOptions::default().allow_no_match(),
    )
    .unwrap();
    assert!(tags.is_empty());
}

#[rstest]
fn allow_no_match_keeps_empty_query_error(recipe: ParsedDocument) {
    let doc = &recipe.document;
    let result = find_with_options(
        doc,
        doc.root(),
        &recipe.source,
        &[],
        decode::text,
        FindOptions::default().allow_no_match(),
    );
    assert_eq!(result, Err(FindError::Query(Error::EmptyQuery)));
}

#[rstest]
fn decode_failure_is_reported(recipe: ParsedDocument) {
    let doc = &recipe.document;
    let err = find(
        doc,
        doc.root(),
        &recipe.source,
        &[Matcher::branch(2, "Tags")],
        decode::list_items,
    )
    .unwrap_err();
    assert_eq!(
        err,
        FindError::Decode(DecodeError::ExpectedKind {
            expected: KindTag::List,
            got: KindTag::Heading,
        })
    );
}

#[rstest]
fn unmarshal_into_string_list(recipe: ParsedDocument) {
    let doc = &recipe.document;
    let mut ingredients = StringList::default();
    unmarshal(
        doc,
        doc.root(),
        &recipe.source,
        &[Matcher::branch(2, "Ingredients"), Matcher::List],
        &mut ingredients,
    )
    .unwrap();
    assert_eq!(ingredients.0, vec!["Chicken", "Vegetables", "Salt", "Pepper"]);
}

#[rstest]
fn custom_decoder(simple: ParsedDocument) {
    let doc = &simple.document;
    let texts = find_all(
        doc,
        doc.root(),
        &simple.source,
        &title_and_sub(),
        &Matcher::Tag,
        |doc, node, source| Ok(doc.text(node, source).to_uppercase()),
    )
    .unwrap();
    assert_eq!(texts, vec!["#TAG1", "#TAG2", "#TAG3"]);
}

#[rstest]
fn search_for_collects_nested_tags(simple: ParsedDocument) {
    let doc = &simple.document;
    let mut matchers = title_and_sub();
    matchers.push(Matcher::List);
    let list = query_one(doc, doc.root(), &simple.source, &matchers).unwrap();

    let tags = query_children(
        doc,
        list,
        &simple.source,
        &Matcher::search_for(Matcher::Tag),
    );
    assert_eq!(tags.len(), 2);
}

#[rstest]
fn found_list_can_be_extended(recipe: ParsedDocument) {
    let ParsedDocument {
        mut document,
        mut source,
        ..
    } = recipe;
    let list = query_one(
        &document,
        document.root(),
        &source,
        &[Matcher::branch(2, "Ingredients"), Matcher::List],
    )
    .unwrap();

    let item = document.new_list_item(&mut source, "Rice");
    document.append_child(list, item);

    let rendered = render_to_string(&document, document.root(), &source).unwrap();
    assert!(rendered.contains("- Salt\n- Pepper\n- Rice\n"));
}

#[derive(Debug, Deserialize)]
struct Meta {
    title: String,
}

#[test]
fn frontmatter_does_not_disturb_queries() {
    let parsed = Parser::new(ParseOptions::default().with_frontmatter())
        .parse("---\ntitle: Soup\n---\n\n## Ingredients\n\n- Water\n")
        .unwrap();
    let meta: Meta = parsed.frontmatter.as_ref().unwrap().decode().unwrap();
    assert_eq!(meta.title, "Soup");

    let doc = &parsed.document;
    let items = find(
        doc,
        doc.root(),
        &parsed.source,
        &[Matcher::branch(2, "Ingredients"), Matcher::List],
        decode::list_items,
    )
    .unwrap();
    assert_eq!(items, vec!["Water"]);
}
