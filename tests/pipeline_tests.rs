//! End-to-end tests: source files on disk through to written output.

use std::fs;
use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use portc::{Error, Options, Session, Target};

const GAME: &str = r#"
public enum Kind { Wall, Floor = 4, Door }

public delegate int Scorer(int value);

public abstract class Entity {
    protected int x;
    protected int y;
    public const int MAX = 16;

    public abstract int Score();
    public virtual string Name() { return "entity"; }
    public void Move(int dx, int dy) { x += dx; y += dy; }
}

public class Player : Entity {
    private int lives;
    private int[4] keys;

    Player() { lives = 3; }

    public override int Score() { return lives * 100 + keys.Length; }
    public override string Name() { return "player"; }
}

public static class Rules {
    public const int[] BONUS = { 1, 2, 4, 8 };

    public static int Double(int value) { return value * 2; }

    public static int Total(Entity[] all, int count) {
        int sum = 0;
        for (int i = 0; i < count; i++) {
            sum += all[i].Score();
        }
        Scorer scorer = Double;
        return scorer(sum);
    }

    public static int Cost(Kind kind) {
        switch (kind) {
            case Kind.Wall:
                return 0;
            case Kind.Floor:
                return BONUS[1];
            default:
                break;
        }
        return -1;
    }
}
"#;

fn write_source(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, text).unwrap();
    path
}

fn run(target: Target, output: PathBuf, inputs: Vec<PathBuf>) -> Result<Vec<(PathBuf, String)>, Error> {
    let report = Session::new(Options::new(target, output, inputs)).run()?;
    Ok(report
        .written
        .into_iter()
        .map(|path| {
            let contents = fs::read_to_string(&path).unwrap();
            (path, contents)
        })
        .collect())
}

#[test]
fn every_target_compiles_the_game() {
    let dir = TempDir::new().unwrap();
    let input = write_source(dir.path(), "game.pc", GAME);
    for (target, output) in [
        (Target::C89, "game89.c"),
        (Target::C99, "game99.c"),
        (Target::CSharp, "Game.cs"),
        (Target::JavaScript, "game.js"),
    ] {
        let files = run(target, dir.path().join(output), vec![input.clone()]).unwrap();
        assert_eq!(files.len(), 1, "{target}");
        assert!(files[0].1.contains("Generated by portc"), "{target}");
    }
}

#[test]
fn c_output_uses_explicit_tables() {
    let dir = TempDir::new().unwrap();
    let input = write_source(dir.path(), "game.pc", GAME);
    let files = run(Target::C99, dir.path().join("game.c"), vec![input]).unwrap();
    let out = &files[0].1;
    for line in [
        "typedef enum",
        "    Kind_Floor = 4,",
        "typedef int (*Scorer)(int value);",
        "    int (*Score)(Entity *self);",
        "    const char *(*Name)(Entity *self);",
        "    int keys[4];",
        "static const int Rules_BONUS[4] = { 1, 2, 4, 8 };",
        "static void Player_Construct(Player *self)",
        "    Entity_Construct((Entity *) self);",
        "    self->lives = 3;",
        "void Entity_Move(Entity *self, int dx, int dy)",
        "        sum += Entity_Score(all[i]);",
        "    Scorer scorer = Rules_Double;",
        "        case Kind_Floor:",
        "            return Rules_BONUS[1];",
    ] {
        assert!(out.contains(line), "missing {line:?} in\n{out}");
    }
}

#[test]
fn java_writes_a_package_directory() {
    let dir = TempDir::new().unwrap();
    let input = write_source(dir.path(), "game.pc", GAME);
    let out_dir = dir.path().join("java");
    let mut options = Options::new(Target::Java, &out_dir, vec![input]);
    options.namespace = Some("com.example".into());
    let report = Session::new(options).run().unwrap();

    let mut names: Vec<String> = report
        .written
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(
        names,
        vec!["Entity.java", "Kind.java", "Player.java", "Rules.java", "Scorer.java"]
    );

    let scorer = fs::read_to_string(out_dir.join("Scorer.java")).unwrap();
    assert!(scorer.contains("package com.example;"));
    assert!(scorer.contains("public interface Scorer {\n    int invoke(int value);\n}"));
    let rules = fs::read_to_string(out_dir.join("Rules.java")).unwrap();
    assert!(rules.contains("public final class Rules {"), "{rules}");
    assert!(rules.contains("return scorer.invoke(sum);"), "{rules}");
    assert!(rules.contains("Scorer scorer = Rules::Double;"), "{rules}");
}

#[test]
fn resources_come_from_search_dirs() {
    let dir = TempDir::new().unwrap();
    let assets = dir.path().join("assets");
    fs::create_dir(&assets).unwrap();
    fs::write(assets.join("logo.bin"), [0x01, 0x7f, 0xff]).unwrap();
    let input = write_source(
        dir.path(),
        "res.pc",
        r#"public class Res {
            public static int First() {
                const byte[] data = BinaryResource("logo.bin");
                return data[0];
            }
        }"#,
    );

    let mut options = Options::new(Target::C99, dir.path().join("res.c"), vec![input.clone()]);
    options.include_dirs = vec![dir.path().join("empty"), assets.clone()];
    Session::new(options).run().unwrap();
    let c = fs::read_to_string(dir.path().join("res.c")).unwrap();
    assert!(c.contains("static const unsigned char PortcResource_logo_bin[] = {\n    0x01, 0x7f, 0xff\n};"), "{c}");

    let mut options = Options::new(Target::Java, dir.path().join("java"), vec![input]);
    options.include_dirs = vec![assets];
    Session::new(options).run().unwrap();
    let java = fs::read_to_string(dir.path().join("java").join("PortcResource.java")).unwrap();
    assert!(java.contains("static final byte[] logo_bin = {\n        1, 127, -1\n    };"), "{java}");
}

#[test]
fn missing_resource_is_reported_at_its_use() {
    let dir = TempDir::new().unwrap();
    let input = write_source(
        dir.path(),
        "res.pc",
        "public class Res {\n  public static void F() {\n    const byte[] d = BinaryResource(\"gone.bin\");\n  }\n}",
    );
    let err = run(Target::CSharp, dir.path().join("res.cs"), vec![input]).unwrap_err();
    match err {
        Error::Compile { rendered, .. } => {
            assert!(rendered.contains("res.pc(3): ERROR: resource gone.bin not found"), "{rendered}");
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(!dir.path().join("res.cs").exists());
}

#[test]
fn macro_expansions_appear_in_diagnostics() {
    let dir = TempDir::new().unwrap();
    let input = write_source(
        dir.path(),
        "m.pc",
        "macro ADD_MISSING(X) ((X) + missing)\n\
         public class M {\n  public static int F() {\n    return ADD_MISSING(1);\n  }\n}",
    );
    let err = run(Target::JavaScript, dir.path().join("m.js"), vec![input]).unwrap_err();
    let rendered = err.to_string();
    assert!(rendered.contains("   in macro ADD_MISSING at "), "{rendered}");
    assert!(rendered.contains("m.pc(4)"), "{rendered}");
    assert!(rendered.ends_with("   in method M.F"), "{rendered}");
}

#[test]
fn unreadable_input_is_a_read_error() {
    let dir = TempDir::new().unwrap();
    let err = run(Target::C99, dir.path().join("x.c"), vec![dir.path().join("nope.pc")]).unwrap_err();
    assert!(matches!(err, Error::Read { .. }));
}

#[test]
fn warnings_are_reported_with_output() {
    let dir = TempDir::new().unwrap();
    let input = write_source(
        dir.path(),
        "w.pc",
        "public class W {\n  public static int F() {\n    return 1;\n    return 2;\n  }\n}",
    );
    let options = Options::new(Target::CSharp, dir.path().join("w.cs"), vec![input]);
    let report = Session::new(options).run().unwrap();
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("(4): WARNING: unreachable code detected"));
    assert!(dir.path().join("w.cs").exists());
}

#[test]
fn output_is_identical_across_runs() {
    let dir = TempDir::new().unwrap();
    let input = write_source(dir.path(), "game.pc", GAME);
    for target in Target::ALL {
        let output = |run_dir: &str| {
            let name = if target == Target::Java { "java".to_string() } else { format!("out.{}", target.flag()) };
            dir.path().join(run_dir).join(target.flag()).join(name)
        };
        let mut first: Vec<_> = run(target, output("first"), vec![input.clone()])
            .unwrap()
            .into_iter()
            .map(|(path, text)| (path.file_name().unwrap().to_owned(), text))
            .collect();
        let mut second: Vec<_> = run(target, output("second"), vec![input.clone()])
            .unwrap()
            .into_iter()
            .map(|(path, text)| (path.file_name().unwrap().to_owned(), text))
            .collect();
        first.sort();
        second.sort();
        assert!(!first.is_empty(), "{target}");
        assert_eq!(first, second, "{target}");
    }
}

#[test]
fn duplicate_names_across_files_are_rejected() {
    let dir = TempDir::new().unwrap();
    let a = write_source(dir.path(), "a.pc", "public class A { }\n");
    let b = write_source(dir.path(), "b.pc", "\npublic enum A { X }\n");
    let err = run(Target::C99, dir.path().join("ab.c"), vec![a, b]).unwrap_err();
    match err {
        Error::Compile { rendered, .. } => {
            assert!(rendered.contains("b.pc(2): ERROR: A already defined"), "{rendered}");
        }
        other => panic!("unexpected error {other:?}"),
    }
}
