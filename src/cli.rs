use clap::{crate_version, Arg, ArgAction, Command, ValueHint};

const T_LONG_HELP: &str = "The type selects the grammar.
`src` is a part program, `def` holds symbol and label declarations,
`lnk` is a linker descriptor.  When `--file` is given and the type is
omitted, the file extension is used.";
const C_LONG_HELP: &str = "JSON string that modifies the analysis, e.g.
`{\"flag\":{\"unknownSymbol\":\"ignore\"},\"workspace\":{\"maxFiles\":500}}`
severities are `ignore`, `hint`, `info`, `warn`, `error`";

fn file_arg(help: &'static str, req: bool, shell_hint: bool) -> Arg {
    let ans = Arg::new("file").short('f').long("file").value_name("PATH").required(req).help(help);
    if shell_hint {
        ans.value_hint(ValueHint::FilePath)
    } else {
        ans
    }
}

pub fn build_cli() -> Command {
    let long_help = "mbkit is always invoked with exactly one of several subcommands.
The subcommands are generally designed to function as nodes in a pipeline.
Set RUST_LOG environment variable to control logging level.
  levels: trace,debug,info,warn,error

Examples:
---------
language line entry:   `mbkit verify -t src`
language file check:   `mbkit verify -f part.src -w .`
pipeline:              `cat part.src | mbkit verify -t src > checked.src`";

    let mut main_cmd = Command::new("mbkit")
        .about("Language analysis for Macro B part programs.")
        .after_long_help(long_help)
        .version(crate_version!());

    main_cmd = main_cmd.subcommand(
        Command::new("verify")
            .arg(Arg::new("type").long("type").short('t').value_name("TYPE").help("type of the file")
                    .long_help(T_LONG_HELP)
                    .required(false)
                    .value_parser(["src", "def", "lnk"]),
            )
            .arg(file_arg("path of the file to verify, otherwise stdin",false,true))
            .arg(Arg::new("ast").long("ast").help("write the syntax tree to stderr").action(ArgAction::SetTrue))
            .arg(Arg::new("config").long("config").short('c').value_name("JSON").help("modify diagnostic configuration")
                .long_help(C_LONG_HELP)
                .required(false)
                .default_value(""),
            )
            .arg(Arg::new("workspace").long("workspace").short('w').value_name("PATH").help("workspace directory")
                .value_hint(ValueHint::DirPath)
                .required(false)
            )
            .about("read from stdin or file and perform language analysis"),
    );
    main_cmd = main_cmd.subcommand(
        Command::new("completions")
            .arg(
                Arg::new("shell").short('s').long("shell").help("shell target").value_name("NAME")
                    .required(true)
                    .value_parser(["bash","elv","fish","ps1","zsh"])
            )
            .about("write completions script to stdout for the specified shell")
    );
    return main_cmd;
}
