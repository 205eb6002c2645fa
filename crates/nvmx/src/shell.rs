/// Shell integration printed by `nvmx shell`, for `eval "$(nvmx shell)"` in
/// a profile. Wraps the binary in a function so `nvmx use` can mutate the
/// caller's PATH, and switches versions automatically when a directory with
/// a version file is entered.
pub const SNIPPET: &str = r#"# nvmx shell integration
export NVMX_HOME="${NVMX_HOME:-$HOME/.nvmx}"

nvmx() {
  if [ "$1" = "use" ]; then
    local activation
    activation="$(command nvmx "$@")" || return $?
    eval "$activation"
  else
    command nvmx "$@"
  fi
}

nvmx_auto() {
  local version_file
  version_file="$(command nvmx find-version-file)"

  if [ -n "$version_file" ]; then
    nvmx use >/dev/null 2>&1
  fi
  return 0
}

if [ -n "$ZSH_VERSION" ]; then
  autoload -U add-zsh-hook
  add-zsh-hook chpwd nvmx_auto
elif [ -n "$BASH_VERSION" ]; then
  cd() {
    builtin cd "$@" && nvmx_auto
  }
fi

nvmx_auto
"#;
