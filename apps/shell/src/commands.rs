//! # Shell Commands
//!
//! One command per input line.
//!
//! ## Command Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Browse       products [category] [--sort price-low|price-high|...]    │
//! │               search <query>        show <id>                          │
//! │                                                                         │
//! │  Cart         add <id> [size] [color]   qty <id> <n>   rm <id>         │
//! │               cart [--json]             clear                          │
//! │                                                                         │
//! │  Checkout     set <field> <value>   next   back   cancel   submit      │
//! │               status [--json]       review                              │
//! │                                                                         │
//! │  Account      login <email>   logout   wishlist [id]   save <id>       │
//! │               unsave <id>     subscribe <email>   unsubscribe <email>  │
//! │                                                                         │
//! │  Shell        help   quit                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use vault_core::{FormField, MAX_QUANTITY};
use vault_session::SortBy;

use crate::error::ShellError;

/// A parsed shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Products {
        category: Option<String>,
        sort_by: Option<SortBy>,
    },
    Search(String),
    Show(String),
    Add {
        id: String,
        size: Option<String>,
        color: Option<String>,
    },
    Quantity {
        id: String,
        quantity: i64,
    },
    Remove(String),
    Cart {
        json: bool,
    },
    Clear,
    Set {
        field: FormField,
        value: String,
    },
    Next,
    Back,
    Cancel,
    Review,
    Submit,
    Status {
        json: bool,
    },
    Login(String),
    Logout,
    Wishlist,
    Save(String),
    Unsave(String),
    Subscribe(String),
    Unsubscribe(String),
    Help,
    Quit,
}

/// Splits off the first whitespace-delimited word.
fn split_word(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.find(char::is_whitespace) {
        Some(at) => (&s[..at], s[at..].trim_start()),
        None => (s, ""),
    }
}

fn required<'a>(rest: &'a str, usage: &str) -> Result<&'a str, ShellError> {
    let (word, _) = split_word(rest);
    if word.is_empty() {
        return Err(ShellError::usage(format!("usage: {}", usage)));
    }
    Ok(word)
}

fn optional(word: &str) -> Option<String> {
    (!word.is_empty()).then(|| word.to_string())
}

impl Command {
    /// Parses one input line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Command>, ShellError> {
        let (name, rest) = split_word(line.trim());
        if name.is_empty() {
            return Ok(None);
        }

        let command = match name.to_lowercase().as_str() {
            "products" | "ls" => Self::parse_products(rest)?,
            "search" => {
                if rest.is_empty() {
                    return Err(ShellError::usage("usage: search <query>"));
                }
                Command::Search(rest.to_string())
            }
            "show" => Command::Show(required(rest, "show <id>")?.to_string()),
            "add" => {
                let (id, rest) = split_word(rest);
                if id.is_empty() {
                    return Err(ShellError::usage("usage: add <id> [size] [color]"));
                }
                let (size, rest) = split_word(rest);
                let (color, _) = split_word(rest);
                Command::Add {
                    id: id.to_string(),
                    size: optional(size),
                    color: optional(color),
                }
            }
            "qty" => {
                let (id, rest) = split_word(rest);
                let (quantity, _) = split_word(rest);
                if id.is_empty() || quantity.is_empty() {
                    return Err(ShellError::usage("usage: qty <id> <quantity>"));
                }
                let quantity = quantity.parse::<i64>().map_err(|_| {
                    ShellError::usage(format!("quantity must be a whole number, got '{}'", quantity))
                })?;
                if quantity > MAX_QUANTITY {
                    return Err(ShellError::usage(format!(
                        "quantity must be at most {}",
                        MAX_QUANTITY
                    )));
                }
                Command::Quantity {
                    id: id.to_string(),
                    quantity,
                }
            }
            "rm" | "remove" => Command::Remove(required(rest, "rm <id>")?.to_string()),
            "cart" => Command::Cart {
                json: rest == "--json",
            },
            "clear" => Command::Clear,
            "set" => {
                let (field, value) = split_word(rest);
                if field.is_empty() {
                    return Err(ShellError::usage("usage: set <field> <value>"));
                }
                let field = field.parse::<FormField>().map_err(ShellError::usage)?;
                Command::Set {
                    field,
                    value: value.to_string(),
                }
            }
            "next" => Command::Next,
            "back" => Command::Back,
            "cancel" => Command::Cancel,
            "review" => Command::Review,
            "submit" | "place" => Command::Submit,
            "status" => Command::Status {
                json: rest == "--json",
            },
            "login" => Command::Login(required(rest, "login <email>")?.to_string()),
            "logout" => Command::Logout,
            "wishlist" => match split_word(rest).0 {
                "" => Command::Wishlist,
                id => Command::Save(id.to_string()),
            },
            "save" => Command::Save(required(rest, "save <id>")?.to_string()),
            "unsave" => Command::Unsave(required(rest, "unsave <id>")?.to_string()),
            "subscribe" => Command::Subscribe(required(rest, "subscribe <email>")?.to_string()),
            "unsubscribe" => {
                Command::Unsubscribe(required(rest, "unsubscribe <email>")?.to_string())
            }
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => {
                return Err(ShellError::usage(format!(
                    "unknown command '{}', try 'help'",
                    other
                )))
            }
        };

        Ok(Some(command))
    }

    fn parse_products(rest: &str) -> Result<Command, ShellError> {
        let mut category = None;
        let mut sort_by = None;
        let mut words = rest.split_whitespace();

        while let Some(word) = words.next() {
            if word == "--sort" {
                let value = words
                    .next()
                    .ok_or_else(|| ShellError::usage("usage: products [category] --sort <order>"))?;
                sort_by = Some(
                    value
                        .parse::<SortBy>()
                        .map_err(|e| ShellError::usage(e.to_string()))?,
                );
            } else {
                category = Some(word.to_string());
            }
        }

        Ok(Command::Products { category, sort_by })
    }
}

pub const HELP: &str = "\
Browse
  products [category] [--sort price-low|price-high|rating|latest]
  search <query>            show <id>
Cart
  add <id> [size] [color]   qty <id> <n>   rm <id>   cart [--json]   clear
Checkout
  set <field> <value>       fields: firstName lastName email address city
                                    postalCode country cardName cardNumber
                                    expDate cvv
  next   back   cancel   review   submit   status [--json]
Account
  login <email>   logout   wishlist [id]   save <id>   unsave <id>
  subscribe <email>   unsubscribe <email>
Shell
  help   quit";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn parse(line: &str) -> Command {
        Command::parse(line).unwrap().unwrap()
    }

    #[test]
    fn test_blank_line() {
        assert_eq!(Command::parse("   ").unwrap(), None);
    }

    #[test]
    fn test_products_with_sort_and_category() {
        assert_eq!(
            parse("products Women --sort price-high"),
            Command::Products {
                category: Some("Women".into()),
                sort_by: Some(SortBy::PriceHigh),
            }
        );
        assert_eq!(
            parse("ls"),
            Command::Products {
                category: None,
                sort_by: None
            }
        );
        assert!(Command::parse("products --sort cheapest").is_err());
    }

    #[test]
    fn test_add_with_variant() {
        assert_eq!(
            parse("add 1 M White"),
            Command::Add {
                id: "1".into(),
                size: Some("M".into()),
                color: Some("White".into()),
            }
        );
        assert_eq!(
            parse("ADD 6"),
            Command::Add {
                id: "6".into(),
                size: None,
                color: None,
            }
        );
    }

    #[test]
    fn test_qty_requires_number() {
        assert_eq!(
            parse("qty 2 3"),
            Command::Quantity {
                id: "2".into(),
                quantity: 3
            }
        );
        let err = Command::parse("qty 2 lots").unwrap_err();
        assert_eq!(err.code, ErrorCode::Usage);
    }

    #[test]
    fn test_qty_rejects_huge_quantity() {
        let err = Command::parse("qty 1 9000000000000000000").unwrap_err();
        assert_eq!(err.code, ErrorCode::Usage);
        assert!(err.message.contains("at most 99"));
        assert!(Command::parse("qty 1 99").unwrap().is_some());
    }

    #[test]
    fn test_set_keeps_value_spaces() {
        assert_eq!(
            parse("set card_number 4242 4242 4242 4242"),
            Command::Set {
                field: FormField::CardNumber,
                value: "4242 4242 4242 4242".into(),
            }
        );
        assert_eq!(
            parse("set postalCode"),
            Command::Set {
                field: FormField::PostalCode,
                value: String::new(),
            }
        );
        assert!(Command::parse("set shoe_size 42").is_err());
    }

    #[test]
    fn test_search_takes_whole_query() {
        assert_eq!(parse("search wool sweater"), Command::Search("wool sweater".into()));
        assert!(Command::parse("search").is_err());
    }

    #[test]
    fn test_json_flags() {
        assert_eq!(parse("cart --json"), Command::Cart { json: true });
        assert_eq!(parse("status"), Command::Status { json: false });
    }

    #[test]
    fn test_wishlist_with_id_saves() {
        assert_eq!(parse("wishlist"), Command::Wishlist);
        assert_eq!(parse("wishlist 5"), Command::Save("5".into()));
    }

    #[test]
    fn test_unknown_command() {
        let err = Command::parse("dance").unwrap_err();
        assert!(err.message.contains("unknown command 'dance'"));
    }
}
