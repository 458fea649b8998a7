use std::fs;
use std::path::Path;

use spfx_scaffold::{
    materialize::Materializer,
    policy::{ExclusionSet, InclusionPolicy},
    tokens::{contains_placeholder, MissingTokens, TokenTable},
};
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: impl AsRef<[u8]>) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn materialize(src: &Path, dest: &Path, tokens: &TokenTable, policy: &InclusionPolicy) {
    Materializer::new(tokens, policy).materialize(src, dest).unwrap();
}

#[test_log::test]
fn test_template_suffix_is_stripped() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write(src.path(), "pkg.json.tmpl", "{{NAME}}");

    let tokens = TokenTable::new().with("NAME", "demo");
    materialize(src.path(), out.path(), &tokens, &InclusionPolicy::Unrestricted);

    assert_eq!(fs::read_to_string(out.path().join("pkg.json")).unwrap(), "demo");
    assert!(!out.path().join("pkg.json.tmpl").exists());
}

#[test_log::test]
fn test_hidden_file_is_unescaped() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write(src.path(), "dot-env", "X={{VAL}}");
    write(src.path(), "nested/dot-gitignore.tmpl", "{{VAL}}");

    let tokens = TokenTable::new().with("VAL", "1");
    materialize(src.path(), out.path(), &tokens, &InclusionPolicy::Unrestricted);

    assert_eq!(fs::read_to_string(out.path().join(".env")).unwrap(), "X=1");
    assert_eq!(fs::read_to_string(out.path().join("nested/.gitignore")).unwrap(), "1");
    assert!(!out.path().join("dot-env").exists());
}

#[test_log::test]
fn test_hidden_binary_is_copied_verbatim() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let mut png = vec![0x89, b'P', b'N', b'G', 0x00, 0xff];
    png.extend_from_slice(b"{{X}}");
    write(src.path(), "dot-logo.png", &png);
    write(src.path(), "dot-icon.bin", "GIF89a{{X}}");

    let tokens = TokenTable::new().with("X", "replaced");
    materialize(src.path(), out.path(), &tokens, &InclusionPolicy::Unrestricted);

    assert_eq!(fs::read(out.path().join(".logo.png")).unwrap(), png);
    assert_eq!(fs::read_to_string(out.path().join(".icon.bin")).unwrap(), "GIF89a{{X}}");
}

#[test_log::test]
fn test_plain_file_is_copied_verbatim() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write(src.path(), "LICENSE", "Copyright {{YEAR}}");

    // No suffix and no text extension: copied as-is, so strict mode does not see it.
    materialize(src.path(), out.path(), &TokenTable::new(), &InclusionPolicy::Unrestricted);
    assert_eq!(fs::read_to_string(out.path().join("LICENSE")).unwrap(), "Copyright {{YEAR}}");
}

#[test_log::test]
fn test_protected_file_is_untouched() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write(src.path(), "config/package-solution.json", "{}");
    write(src.path(), "config/serve.json", "{\"port\": 4321}");
    write(out.path(), "config/package-solution.json", "{\"customized\": true}");

    let policy =
        InclusionPolicy::Protective(ExclusionSet::new().with_path("config/package-solution.json"));
    let manifest = Materializer::new(&TokenTable::new(), &policy).materialize(src.path(), out.path()).unwrap();

    assert_eq!(
        fs::read_to_string(out.path().join("config/package-solution.json")).unwrap(),
        "{\"customized\": true}"
    );
    assert!(out.path().join("config/serve.json").is_file());
    assert_eq!(manifest.overwritten().count(), 0);
}

#[test_log::test]
fn test_binary_is_copied_verbatim() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let mut bytes = vec![0x89, b'P', b'N', b'G', 0x00, 0xff];
    bytes.extend_from_slice(b"{{X}}");
    bytes.extend_from_slice(&[0xfe, 0x00]);
    write(src.path(), "logo.png", &bytes);

    let tokens = TokenTable::new().with("X", "replaced");
    materialize(src.path(), out.path(), &tokens, &InclusionPolicy::Unrestricted);

    assert_eq!(fs::read(out.path().join("logo.png")).unwrap(), bytes);
}

#[test_log::test]
fn test_binary_placeholders_are_not_unresolved() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write(src.path(), "font.woff2", "{{MISSING}}");

    // Strict mode would fail if binary content were scanned.
    materialize(src.path(), out.path(), &TokenTable::new(), &InclusionPolicy::Unrestricted);
    assert_eq!(fs::read_to_string(out.path().join("font.woff2")).unwrap(), "{{MISSING}}");
}

#[test_log::test]
fn test_excluded_directory_is_not_descended() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write(src.path(), ".vscode/settings.json", "{}");
    write(src.path(), ".vscode/deep/launch.json", "{}");
    write(src.path(), "src/index.ts", "export {};");

    let policy = InclusionPolicy::Protective(ExclusionSet::new().with_dir(".vscode"));
    materialize(src.path(), out.path(), &TokenTable::new(), &policy);

    assert!(!out.path().join(".vscode").exists());
    assert!(out.path().join("src/index.ts").is_file());
}

#[test_log::test]
fn test_policy_sees_template_paths() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write(src.path(), "src/{{NAME}}/index.ts", "{{NAME}}");
    write(src.path(), "src/{{NAME}}/keep.ts", "{{NAME}}");

    // The rule names the literal template path, not the generated one.
    let policy = InclusionPolicy::Protective(ExclusionSet::new().with_path("src/{{NAME}}/index.ts"));
    let tokens = TokenTable::new().with("NAME", "Widget");
    materialize(src.path(), out.path(), &tokens, &policy);

    assert!(!out.path().join("src/Widget/index.ts").exists());
    assert_eq!(fs::read_to_string(out.path().join("src/Widget/keep.ts")).unwrap(), "Widget");
}

#[test_log::test]
fn test_full_token_table_leaves_no_placeholders() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write(
        src.path(),
        "src/webparts/{{COMPONENT_PASCAL}}/{{COMPONENT_PASCAL}}WebPart.ts",
        "export default class {{COMPONENT_PASCAL}}WebPart { id = '{{COMPONENT_ID}}'; css = styles.{{COMPONENT_CAMEL}}; }",
    );
    write(src.path(), "README.md", "# {{SOLUTION_TITLE}} ({{SOLUTION_NAME}})");

    let tokens = TokenTable::for_solution("hello-world", 22);
    let manifest = Materializer::new(&tokens, &InclusionPolicy::Unrestricted)
        .materialize(src.path(), out.path())
        .unwrap();

    for entry in manifest.files() {
        let content = fs::read_to_string(&entry.path).unwrap();
        assert!(!contains_placeholder(&content), "{} kept a placeholder", entry.path.display());
    }
    let webpart = out.path().join("src/webparts/HelloWorld/HelloWorldWebPart.ts");
    let content = fs::read_to_string(webpart).unwrap();
    assert!(content.contains("class HelloWorldWebPart"));
    assert!(content.contains("styles.helloWorld"));
    assert_eq!(fs::read_to_string(out.path().join("README.md")).unwrap(), "# Hello World (hello-world)");
}

#[test_log::test]
fn test_output_matches_expected_tree() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let expected = TempDir::new().unwrap();

    write(src.path(), "dot-gitignore.tmpl", "node_modules\n");
    write(src.path(), "config/{{NAME}}.json", "{\"name\": \"{{NAME}}\"}");
    write(src.path(), "assets/icon.png", [0u8, 1, 2, 3]);
    fs::create_dir_all(src.path().join("empty")).unwrap();

    write(expected.path(), ".gitignore", "node_modules\n");
    write(expected.path(), "config/demo.json", "{\"name\": \"demo\"}");
    write(expected.path(), "assets/icon.png", [0u8, 1, 2, 3]);
    fs::create_dir_all(expected.path().join("empty")).unwrap();

    let tokens = TokenTable::new().with("NAME", "demo");
    materialize(src.path(), out.path(), &tokens, &InclusionPolicy::Unrestricted);

    assert!(!dir_diff::is_different(out.path(), expected.path()).unwrap());
}

#[test_log::test]
fn test_rematerialization_is_stable() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write(src.path(), "a/{{NAME}}.md", "{{NAME}}");

    let tokens = TokenTable::new().with("NAME", "demo");
    let policy = InclusionPolicy::Unrestricted;
    let first = Materializer::new(&tokens, &policy).materialize(src.path(), out.path()).unwrap();
    let second = Materializer::new(&tokens, &policy).materialize(src.path(), out.path()).unwrap();

    assert_eq!(first.overwritten().count(), 0);
    assert_eq!(second.overwritten().count(), 1);
    assert_eq!(fs::read_to_string(out.path().join("a/demo.md")).unwrap(), "demo");
}

#[test_log::test]
fn test_keep_mode_leaves_placeholders() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write(src.path(), "later.md", "{{KNOWN}} {{LATER}}");

    let tokens = TokenTable::new().with("KNOWN", "now");
    Materializer::new(&tokens, &InclusionPolicy::Unrestricted)
        .with_missing_tokens(MissingTokens::Keep)
        .materialize(src.path(), out.path())
        .unwrap();

    assert_eq!(fs::read_to_string(out.path().join("later.md")).unwrap(), "now {{LATER}}");
}
