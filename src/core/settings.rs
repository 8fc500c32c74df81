// Settings ///////////////////////////////////////////////////////////////////
// Keys and defaults shared by tools, the tool manager and saved workspaces.

// Config Keys ////////////////////////////////////////////////////////////////

/// Key holding the class id a tool was created from
pub const CLASS_KEY: &str = "Class";
/// Key holding the display name of a tool
pub const NAME_KEY: &str = "Name";
/// Key holding the value of a property that also has children
pub const VALUE_KEY: &str = "Value";
/// Key holding the list of tools in a saved workspace
pub const TOOLS_KEY: &str = "Tools";

// Tool Defaults //////////////////////////////////////////////////////////////

/// Description given to placeholder tools whose class could not be created
pub const FAILED_TOOL_DESCRIPTION: &str =
    "The class required for this tool could not be loaded.";

// Logging ////////////////////////////////////////////////////////////////////

/// Directives appended to `RUST_LOG` when the logger is initialized
pub const DEFAULT_LOG_DIRECTIVES: &[&str] = &["info"];
