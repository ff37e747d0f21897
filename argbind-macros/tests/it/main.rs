mod full;
mod report;
mod tool;

use std::{ffi::OsString, fmt};

use argbind::{Command, Parser, Run, Subcommands, SUCCESS};
use expect_test::{expect, Expect};

fn check<F, A>(f: F, args: &str, expect: Expect)
where
    F: FnOnce(Vec<OsString>) -> argbind::Result<A>,
    A: fmt::Debug,
{
    let args = args.split_ascii_whitespace().map(OsString::from).collect::<Vec<_>>();
    let res = f(args);
    match res {
        Ok(args) => {
            expect.assert_debug_eq(&args);
        }
        Err(argbind::Error::Parse(err)) => {
            expect.assert_eq(&format!("{:?}", err.kind()));
        }
        Err(err) => {
            expect.assert_eq(&err.to_string());
        }
    }
}

#[test]
fn report() {
    check(
        report::Report::from_vec,
        "report.txt",
        expect![[r#"
            Report {
                filename: "report.txt",
                debug: true,
            }
        "#]],
    );
    check(
        report::Report::from_vec,
        "-d report.txt",
        expect![[r#"
            Report {
                filename: "report.txt",
                debug: false,
            }
        "#]],
    );
    check(report::Report::from_vec, "", expect![[r#"MissingRequiredArgument"#]]);
    check(report::Report::from_vec, "report.txt --bogus", expect![[r#"UnknownArgument"#]]);

    let mut cmd = report::Report::from_vec(vec!["report.txt".into()]).unwrap();
    cmd.setup();
    assert_eq!(cmd.run(), SUCCESS);
}

#[test]
fn full() {
    check(
        full::Full::from_vec,
        "a.txt",
        expect![[r#"
            Full {
                filename: "a.txt",
                mode: Fast,
                color: "red",
                mode_name: "Thorough",
                iterations: 10,
                ratio: 0.5,
                args: [],
                seed: None,
                verbose: 0,
                tag: "alpha",
                cache: [],
            }
        "#]],
    );
    check(
        full::Full::from_vec,
        "a.txt --mode Thorough --color blue -n 3 --pp 0.25 --args x y --args z --seed 7 -vvv",
        expect![[r#"
            Full {
                filename: "a.txt",
                mode: Thorough,
                color: "blue",
                mode_name: "Thorough",
                iterations: 3,
                ratio: 0.25,
                args: [
                    "x",
                    "y",
                    "z",
                ],
                seed: Some(
                    7,
                ),
                verbose: 3,
                tag: "alpha",
                cache: [],
            }
        "#]],
    );
    check(full::Full::from_vec, "a.txt --color purple", expect![[r#"InvalidValue"#]]);
    check(full::Full::from_vec, "a.txt --mode Slow", expect![[r#"InvalidValue"#]]);
    check(full::Full::from_vec, "a.txt --mode_name Slow", expect![[r#"InvalidValue"#]]);
    check(full::Full::from_vec, "a.txt -n lol", expect![[r#"ValueValidation"#]]);
}

#[test]
fn optional_sequence() {
    check(
        full::Gather::from_vec,
        "",
        expect![[r#"
            Gather {
                files: None,
            }
        "#]],
    );
    check(
        full::Gather::from_vec,
        "a b",
        expect![[r#"
            Gather {
                files: Some(
                    [
                        "a",
                        "b",
                    ],
                ),
            }
        "#]],
    );
}

#[test]
fn help_comes_from_docs() {
    let parser = Parser::new(full::Full::definition()).unwrap();
    let help = parser.command().clone().render_help().to_string();
    assert!(help.starts_with("Run the full pipeline."), "{help}");
    assert!(!help.contains("Everything below"), "{help}");
    assert!(help.contains("--ratio"), "{help}");
    assert!(help.contains("--pp"), "{help}");

    let parser = Parser::new(full::Gather::definition()).unwrap();
    let help = parser.command().clone().render_help().to_string();
    assert!(help.contains("Files to gather, if any"), "{help}");
    assert!(help.contains("FILE"), "{help}");
}

#[test]
fn completer_is_attached() {
    let def = full::Full::definition();
    let tag = def.fields().find(|it| it.name == "tag").unwrap();
    let candidates = tag.completer.as_ref().unwrap().candidates("b");
    assert_eq!(candidates, [argbind::Candidate::new("beta")]);
}

#[test]
fn sub_commands() {
    let names = tool::ToolCmd::registry().iter().map(|(it, _)| it.to_string()).collect::<Vec<_>>();
    assert_eq!(names, ["fetch", "analysis-stats", "srv"]);

    check(
        tool::Tool::from_vec,
        "",
        expect![[r#"
            Tool {
                verbose: 0,
                sub_command: None,
            }
        "#]],
    );
    check(
        tool::Tool::from_vec,
        "-v analysis-stats . --parallel",
        expect![[r#"
            Tool {
                verbose: 1,
                sub_command: Some(
                    AnalysisStats(
                        AnalysisStats {
                            path: ".",
                            parallel: true,
                        },
                    ),
                ),
            }
        "#]],
    );
    check(
        tool::Tool::from_vec,
        "fetch --force",
        expect![[r#"
            Tool {
                verbose: 0,
                sub_command: Some(
                    Fetch(
                        Fetch {
                            remote: "origin",
                            force: true,
                        },
                    ),
                ),
            }
        "#]],
    );
    check(
        tool::Tool::from_vec,
        "srv --dir . launch --log",
        expect![[r#"
            Tool {
                verbose: 0,
                sub_command: Some(
                    Server(
                        Server {
                            dir: Some(
                                ".",
                            ),
                            sub_command: Some(
                                Launch(
                                    Launch {
                                        log: true,
                                    },
                                ),
                            ),
                        },
                    ),
                ),
            }
        "#]],
    );
    check(
        tool::Tool::from_vec,
        "srv watch",
        expect![[r#"
            Tool {
                verbose: 0,
                sub_command: Some(
                    Server(
                        Server {
                            dir: None,
                            sub_command: Some(
                                Watch(
                                    Watch,
                                ),
                            ),
                        },
                    ),
                ),
            }
        "#]],
    );
    check(tool::Tool::from_vec, "server", expect![[r#"InvalidSubcommand"#]]);
    check(tool::Tool::from_vec, "--version", expect![[r#"DisplayVersion"#]]);
}
