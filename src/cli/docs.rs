//! Documentation content for the claimpath CLI

use super::CliError;

/// Available documentation categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocCategory {
    Syntax,
    Operators,
    Semantics,
}

impl DocCategory {
    /// Parse category name from string
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "syntax" => Some(Self::Syntax),
            "operators" | "ops" => Some(Self::Operators),
            "semantics" | "matching" => Some(Self::Semantics),
            _ => None,
        }
    }
}

/// Get the docs overview (category listing)
pub fn get_docs_overview() -> &'static str {
    r#"CLAIMPATH DOCUMENTATION

claimpath matches JSON documents (such as token claims) against filter queries
written in a subset of the JSONPath filter syntax. A query answers one question:
does this document match?

DOCUMENTATION CATEGORIES

  syntax       Attribute paths, literals, lists, regular expressions, grouping
  operators    Comparison, membership, regex and logical operators
  semantics    Missing attributes, type mismatches and error handling

QUICK REFERENCE

  @.exp                      Attribute path from the document root
  @.exp > 1000               Comparison
  'kafka' in @.aud           Membership
  @.iss =~ /^https:.+/i      Regex match
  a and b, a && b            Both
  a or b, a || b             Either
  !(...)                     Negation

Run 'claimpath doc <category>' for detailed documentation.
"#
}

/// Get documentation for a specific category
pub fn get_doc_category(name: &str) -> Result<&'static str, CliError> {
    match DocCategory::from_name(name) {
        Some(DocCategory::Syntax) => Ok(SYNTAX_DOC),
        Some(DocCategory::Operators) => Ok(OPERATORS_DOC),
        Some(DocCategory::Semantics) => Ok(SEMANTICS_DOC),
        None => Err(CliError::UnknownCategory(name.to_string())),
    }
}

const SYNTAX_DOC: &str = r#"SYNTAX - Paths, Literals and Grouping

ATTRIBUTE PATHS
  @.name.nested
    Resolved from the document root, one key at a time.

    Example:
      Input:  {"roles": {"client-roles": {"kafka": ["kafka-user"]}}}
      Query:  @.roles.client-roles.kafka != null
      Output: true

    Constraints:
      - Segments end at '.', whitespace or ')'
      - Deep scan (@..name) is not supported
      - Array indexing and bracket notation (@.aud[0]) are not supported

LITERALS
  'text' or "text"     Strings, no escape sequences
  42, -1.5             Numbers, compared as exact decimals
  null                 Null
  ['a', 42, null]      Lists of strings, numbers and null

REGULAR EXPRESSIONS
  /pattern/flags
    Only to the right of =~. Write \/ for a literal slash.
    Flags: i (ignore case), m (multi-line), s (dot matches newline),
           x (ignore whitespace). Inline flags such as (?i) also work.

GROUPING AND NEGATION
  (a or b) and c
  !(a and b)

  Operators and keywords must be separated by whitespace:
    @.a == 1      compares attribute 'a' with 1
    @.a==1        checks an attribute literally named 'a==1'
"#;

const OPERATORS_DOC: &str = r#"OPERATORS - Comparison, Membership and Logic

COMPARISON
  ==  !=  <  >  <=  >=
    The left side must be an attribute path.
    <, >, <= and >= do not accept null on the right.
    >= is defined as "not <", and <= as "not >".

MEMBERSHIP
  in, nin
    @.custom in ['a', 42]       attribute value in a list
    'kafka' in @.aud            literal in an array attribute
    @.sub in @.allowed          attribute in another array attribute

  anyof, noneof
    @.roles anyof ['admin', 'ops']     some element is in the list
    @.roles noneof ['banned']          no element is in the list

REGEX
  =~
    @.custom =~ /^custom-.+$/
    Matches the textual form of strings, numbers and booleans.

LOGICAL
  and, &&     Stops at the first false clause
  or, ||      Evaluates every clause
  !           Negates the following clause or group

  Clauses are combined strictly left to right:
    a or b and c   is   (a or b) and c

  Reaching 'and' with a false result ends the match as false, even
  when an 'or' clause follows later:
    a and b or c   is false whenever a is false
"#;

const SEMANTICS_DOC: &str = r#"SEMANTICS - Missing Values and Errors

MISSING ATTRIBUTES
  @.missing == null       true
  @.missing != null       false
  @.missing == 'x'        false
  @.missing in [null]     true

NUMBERS
  Compared as exact decimals: @.level == 9 matches 9 and 9.0,
  but not 9.0000001.

TYPE MISMATCHES
  A comparison that cannot be made against a literal, such as
  @.name > 5 for a string name, counts as false and matching continues.

  Ordering two attributes of incompatible types, such as
  @.name > @.level, fails the whole match.

COMPATIBILITY MODE
  'claimpath check --compat' ignores '!' and refuses =~, anyof and noneof
  at match time, for queries written against that behavior.
"#;
