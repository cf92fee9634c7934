use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;

use marshal_codec::{BeanContext, ParseError, ParseErrorKind, ParserConfig, ParserSession};
use marshal_reflect::{
    Bean, BeanRef, ListRef, MapRef, Number, PropertyMeta, TypeHandle, TypeKind, Value,
};

const INVALID_UNICODE: &str = "Invalid Unicode escape sequence in string.";
const EXPECTED_VALUE: &str = "Expected one of the following characters: {,[,',\",LITERAL.";

/// Characters allowed in unquoted attribute names.
fn is_bare_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '$' | '_' | '-' | '.')
}

/// JSON number rules that lax mode does not enforce: no leading zeros,
/// no leading or trailing decimal point, no hex.
fn is_strict_number(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    let mut chars = digits.chars();
    match chars.next() {
        None | Some('.') => return false,
        Some('0') => {
            if chars.next().is_some_and(|c| !matches!(c, '.' | 'e' | 'E')) {
                return false;
            }
        }
        Some(_) => {}
    }
    match text.find('.') {
        Some(i) => text[i + 1..].starts_with(|c: char| c.is_ascii_digit()),
        None => true,
    }
}

// -----------------------------------------------------------------------------
// JsonParserSession

/// Recursive-descent JSON grammar on top of a [`ParserSession`].
pub(crate) struct JsonParserSession<'a> {
    session: ParserSession<'a>,
}

impl<'a> JsonParserSession<'a> {
    pub(crate) fn new(input: &'a str, config: &'a ParserConfig, context: &'a BeanContext) -> Self {
        Self {
            session: ParserSession::new(input, config, context),
        }
    }

    #[inline]
    fn strict(&self) -> bool {
        self.session.is_strict()
    }

    #[inline]
    fn peek(&self) -> Option<char> {
        self.session.reader().peek()
    }

    #[inline]
    fn next(&mut self) -> Option<char> {
        self.session.reader_mut().next()
    }

    #[inline]
    fn eat(&mut self, expected: char) -> bool {
        self.session.reader_mut().eat(expected)
    }

    fn remainder(&self) -> &'a str {
        let reader = self.session.reader();
        &reader.input()[reader.position()..]
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        self.session.syntax_error(message)
    }

    // -------------------------------------------------------------------------
    // Values

    /// Parses one value of type `ty`, applying its swap and wrapper
    /// attribute.
    pub(crate) fn parse_anything(
        &mut self,
        ty: &TypeHandle,
        property: Option<&PropertyMeta>,
    ) -> Result<Value, ParseError> {
        let context = self.session.context();
        if let Some(swap) = context.swaps().get(ty) {
            let value = self.parse_anything(&swap.swapped_type(), property)?;
            if value.is_null() {
                return Ok(Value::Null);
            }
            return self.session.unswap(swap, &value, ty);
        }

        let previous = self.session.set_current_class(Some(ty));
        self.skip_comments_and_space()?;
        let wrapper = ty.wrapper_attr();
        if let Some(wrapper) = wrapper {
            self.skip_wrapper_attr_start(wrapper)?;
        }
        let value = self.parse_unwrapped(ty, property)?;
        if wrapper.is_some() {
            self.skip_wrapper_attr_end()?;
        }
        self.session.restore_current_class(previous);
        Ok(value)
    }

    fn parse_unwrapped(
        &mut self,
        ty: &TypeHandle,
        property: Option<&PropertyMeta>,
    ) -> Result<Value, ParseError> {
        let Some(c) = self.peek() else {
            return match self.strict() {
                true => Err(self.error("Empty input.")),
                false => Ok(Value::Null),
            };
        };
        match c {
            ',' | '}' | ']' if self.strict() => return Err(self.error("Missing value detected.")),
            ',' | '}' | ']' => return Ok(Value::Null),
            'n' if self.strict() || self.remainder().starts_with("null") => {
                self.parse_keyword("null")?;
                return Ok(Value::Null);
            }
            _ => {}
        }

        match ty.kind() {
            TypeKind::Any => self.parse_untyped(c, ty, property),
            TypeKind::Bool => self.parse_boolean(),
            TypeKind::String | TypeKind::Uri | TypeKind::Char => {
                let text = self.parse_string()?;
                self.session.convert_attr_to_type(&text, ty)
            }
            TypeKind::Integer | TypeKind::Float => self.parse_number(ty),
            TypeKind::Map => {
                let map = MapRef::new();
                self.parse_into_map(&map, &ty.key_type(), &ty.value_type(), property)?;
                Ok(Value::Map(map))
            }
            TypeKind::Collection | TypeKind::Array if c == '{' => self.parse_cast(ty, property),
            TypeKind::Collection | TypeKind::Array => {
                let list = ListRef::new();
                self.parse_into_collection(&list, &ty.element_type(), property)?;
                Ok(match ty.kind() {
                    TypeKind::Array => Value::Array(list),
                    _ => Value::Collection(list),
                })
            }
            TypeKind::Bean if ty.can_instantiate() => self.parse_bean(ty, property),
            _ if c == '{' => self.parse_cast(ty, property),
            _ if ty.from_string().is_some() && (matches!(c, '"' | '\'') || !self.strict()) => {
                let text = self.parse_string()?;
                self.session.convert_attr_to_type(&text, ty)
            }
            _ => Err(self.error(format!(
                "Unrecognized syntax for class type '{ty}', starting character '{c}'"
            ))),
        }
    }

    /// A value whose type is inferred from the input. Lax mode reads any
    /// other bare word as a string.
    fn parse_untyped(
        &mut self,
        c: char,
        ty: &TypeHandle,
        property: Option<&PropertyMeta>,
    ) -> Result<Value, ParseError> {
        match c {
            '{' => self.parse_cast(ty, property),
            '[' => {
                let list = ListRef::new();
                self.parse_into_collection(&list, &TypeHandle::any(), property)?;
                Ok(Value::Collection(list))
            }
            '"' | '\'' => self.parse_string().map(Value::String),
            '0'..='9' | '-' | '.' => self.parse_number(ty),
            't' if self.strict() || self.remainder().starts_with("true") => {
                self.parse_keyword("true")?;
                Ok(Value::Bool(true))
            }
            'f' if self.strict() || self.remainder().starts_with("false") => {
                self.parse_keyword("false")?;
                Ok(Value::Bool(false))
            }
            _ if !self.strict() => self.parse_string().map(Value::String),
            _ => {
                self.parse_keyword("false")?;
                Ok(Value::Bool(false))
            }
        }
    }

    /// Parses an object as an untyped map and casts it through its type
    /// discriminator.
    fn parse_cast(&mut self, ty: &TypeHandle, property: Option<&PropertyMeta>) -> Result<Value, ParseError> {
        let map = MapRef::new();
        self.parse_into_map(&map, &TypeHandle::string(), &TypeHandle::any(), property)?;
        self.session.cast(map, ty, property)
    }

    fn parse_boolean(&mut self) -> Result<Value, ParseError> {
        match self.peek() {
            Some('"' | '\'') => {
                let text = self.parse_string()?;
                Ok(Value::Bool(text.eq_ignore_ascii_case("true")))
            }
            Some('t') => self.parse_keyword("true").map(|()| Value::Bool(true)),
            Some('f') => self.parse_keyword("false").map(|()| Value::Bool(false)),
            _ => {
                let actual: String = self.remainder().chars().take(100).collect();
                Err(self.error(format!(
                    "Unrecognized syntax.  Expected boolean value, actual='{actual}'"
                )))
            }
        }
    }

    fn parse_number(&mut self, ty: &TypeHandle) -> Result<Value, ParseError> {
        let start = self.session.reader().position();
        let text = match self.peek() {
            Some('"' | '\'') => self.parse_string()?,
            _ => String::from(
                self.session
                    .reader_mut()
                    .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '+' | '-')),
            ),
        };
        if self.strict() && !is_strict_number(&text) {
            return Err(self.invalid_number(start, &text));
        }
        match ty.kind() {
            TypeKind::Any => Number::parse(&text, None)
                .map(Value::Number)
                .ok_or_else(|| self.invalid_number(start, &text)),
            _ => self.session.convert_attr_to_type(&text, ty),
        }
    }

    fn invalid_number(&self, start: usize, text: &str) -> ParseError {
        let message = format!("Invalid JSON number: '{text}'");
        self.session.error_at(start, ParseErrorKind::Syntax(message))
    }

    fn parse_keyword(&mut self, keyword: &str) -> Result<(), ParseError> {
        if self.session.reader_mut().eat_str(keyword) {
            return Ok(());
        }
        let actual: String = self.remainder().chars().take(keyword.len()).collect();
        if actual.chars().count() < keyword.len() {
            return Err(self.error(format!(
                "Unrecognized syntax.  Expected='{keyword}', found end-of-file."
            )));
        }
        Err(self.error(format!(
            "Unrecognized syntax.  Expected='{keyword}', Actual='{actual}'"
        )))
    }

    // -------------------------------------------------------------------------
    // Strings

    /// A quoted string, or in lax mode an unquoted token ending at
    /// whitespace, `,`, `}` or `]`. Adjacent strings joined by `+` are
    /// concatenated in lax mode.
    fn parse_string(&mut self) -> Result<String, ParseError> {
        let quote = match self.peek() {
            Some(q @ ('"' | '\'')) => Some(q),
            _ => None,
        };
        if self.strict() && quote != Some('"') {
            let found = self.peek().map(String::from).unwrap_or_default();
            return Err(self.error(match quote {
                Some(_) => format!("Invalid quote character \"{found}\" being used."),
                None => format!(
                    "Did not find quote character marking beginning of string.  Character=\"{found}\""
                ),
            }));
        }

        let mut text = String::new();
        if let Some(quote) = quote {
            self.next();
            loop {
                let Some(c) = self.next() else {
                    return Err(self.error(format!("Could not find expected end character '{quote}'.")));
                };
                if c == quote {
                    break;
                }
                if c == '\\' {
                    text.push(self.parse_escape()?);
                    continue;
                }
                if self.strict() && c <= '\u{1f}' {
                    return Err(self.error(format!(
                        "Unescaped control character encountered: '0x{:04X}'",
                        u32::from(c)
                    )));
                }
                text.push(c);
            }
        } else {
            while let Some(c) = self.peek() {
                if matches!(c, ',' | '}' | ']') || c.is_whitespace() {
                    break;
                }
                self.next();
                if c == '\\' {
                    text.push(self.parse_escape()?);
                } else {
                    text.push(c);
                }
            }
        }

        self.skip_comments_and_space()?;
        if self.peek() == Some('+') {
            if self.strict() {
                return Err(self.error("String concatenation detected."));
            }
            self.next();
            self.skip_comments_and_space()?;
            text.push_str(&self.parse_string()?);
        }
        Ok(self.session.trim(text))
    }

    /// The character after a backslash.
    fn parse_escape(&mut self) -> Result<char, ParseError> {
        Ok(match self.next() {
            Some('n') => '\n',
            Some('r') => '\r',
            Some('t') => '\t',
            Some('f') => '\u{c}',
            Some('b') => '\u{8}',
            Some(c @ ('\\' | '/' | '\'' | '"')) => c,
            Some('u') => return self.parse_unicode_escape(),
            _ => return Err(self.error("Invalid escape sequence in string.")),
        })
    }

    /// `\uXXXX`, joining a surrogate pair written as two escapes.
    fn parse_unicode_escape(&mut self) -> Result<char, ParseError> {
        let mut code = self.parse_hex4()?;
        if (0xD800..0xDC00).contains(&code) && self.session.reader_mut().eat_str("\\u") {
            let low = self.parse_hex4()?;
            if !(0xDC00..0xE000).contains(&low) {
                return Err(self.error(INVALID_UNICODE));
            }
            code = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
        }
        char::from_u32(code).ok_or_else(|| self.error(INVALID_UNICODE))
    }

    fn parse_hex4(&mut self) -> Result<u32, ParseError> {
        let mut code = 0;
        for _ in 0..4 {
            match self.next().and_then(|c| c.to_digit(16)) {
                Some(digit) => code = code * 16 + digit,
                None => return Err(self.error(INVALID_UNICODE)),
            }
        }
        Ok(code)
    }

    fn parse_field_name(&mut self) -> Result<String, ParseError> {
        match self.peek() {
            Some('"' | '\'') => self.parse_string(),
            _ if self.strict() => Err(self.error("Unquoted attribute detected.")),
            Some(c) if is_bare_char(c) => {
                Ok(String::from(self.session.reader_mut().take_while(is_bare_char)))
            }
            _ => Err(self.error("Could not find the start of the field name.")),
        }
    }

    // -------------------------------------------------------------------------
    // Containers

    /// Walks the entries of an object, calling `on_entry` with each
    /// attribute name once the reader is positioned at its value.
    fn parse_object(
        &mut self,
        mut on_entry: impl FnMut(&mut Self, String) -> Result<(), ParseError>,
    ) -> Result<(), ParseError> {
        self.skip_comments_and_space()?;
        if !self.eat('{') {
            return Err(self.error("Expected '{' at beginning of JSON object."));
        }
        self.session.enter()?;
        self.skip_comments_and_space()?;

        if !self.eat('}') {
            loop {
                match self.peek() {
                    None => return Err(self.error("Could not find attribute name on JSON object.")),
                    Some('}') => return Err(self.error("Unexpected '}' found in JSON object.")),
                    Some(_) => {}
                }
                let name = self.parse_field_name()?;
                self.skip_comments_and_space()?;
                if !self.eat(':') {
                    return Err(self.error("Could not find ':' following attribute name on JSON object."));
                }
                self.skip_comments_and_space()?;
                if self.peek().is_none() {
                    return Err(self.error(EXPECTED_VALUE));
                }

                on_entry(self, name)?;

                self.skip_comments_and_space()?;
                match self.next() {
                    Some(',') => self.skip_comments_and_space()?,
                    Some('}') => break,
                    _ => return Err(self.error("Could not find '}' marking end of JSON object.")),
                }
            }
        }

        self.session.leave();
        Ok(())
    }

    /// Parses an object into `map`, converting keys and values to the
    /// given types.
    pub(crate) fn parse_into_map(
        &mut self,
        map: &MapRef,
        key_type: &TypeHandle,
        value_type: &TypeHandle,
        property: Option<&PropertyMeta>,
    ) -> Result<(), ParseError> {
        self.parse_object(|this, name| {
            let value = this.parse_anything(value_type, property)?;
            let key = match key_type.kind() {
                TypeKind::Any | TypeKind::String => Value::String(name),
                _ => this.session.convert_attr_to_type(&name, key_type)?,
            };
            map.insert(key, value);
            Ok(())
        })
    }

    /// Parses an array into `list`, converting elements to `element`.
    pub(crate) fn parse_into_collection(
        &mut self,
        list: &ListRef,
        element: &TypeHandle,
        property: Option<&PropertyMeta>,
    ) -> Result<(), ParseError> {
        self.skip_comments_and_space()?;
        if !self.eat('[') {
            return Err(self.error("Expected '[' at beginning of JSON array."));
        }
        self.session.enter()?;
        self.skip_comments_and_space()?;

        if !self.eat(']') {
            loop {
                if self.peek().is_none() {
                    return Err(self.error(EXPECTED_VALUE));
                }
                list.push(self.parse_anything(element, property)?);
                self.skip_comments_and_space()?;
                match self.next() {
                    Some(',') => {
                        self.skip_comments_and_space()?;
                        if matches!(self.peek(), None | Some(']')) {
                            return Err(self.error("Unexpected trailing comma in array."));
                        }
                    }
                    Some(']') => break,
                    _ => return Err(self.error("Expected ',' or ']'.")),
                }
            }
        }

        self.session.leave();
        Ok(())
    }

    /// Parses an object straight into a new instance of a concrete bean
    /// type.
    ///
    /// A type discriminator in first position that resolves to another
    /// instantiable type switches the instance type; elsewhere it is
    /// skipped.
    fn parse_bean(&mut self, ty: &TypeHandle, property: Option<&PropertyMeta>) -> Result<Value, ParseError> {
        let type_property = self.session.context().type_property_name();
        let mut class = ty.clone();
        let mut bean: Option<Box<dyn Bean>> = None;

        self.parse_object(|this, name| {
            if name == type_property {
                let value = this.parse_anything(&TypeHandle::any(), None)?;
                let resolved = value
                    .as_str()
                    .and_then(|name| this.session.resolve_bean_type(name, ty, property))
                    .filter(TypeHandle::can_instantiate);
                if let Some(resolved) = resolved.filter(|_| bean.is_none()) {
                    log::trace!("Parsing '{resolved}' in place of '{class}'");
                    class = resolved;
                }
                return Ok(());
            }

            let instance = match bean.take() {
                Some(instance) => instance,
                None => this.session.new_bean(&class)?,
            };
            let target = bean.insert(instance);
            match class.bean_meta().and_then(|meta| meta.property(&name)) {
                Some(meta) => {
                    let previous = this.session.set_current_property(Some(&name));
                    let value = this.parse_anything(meta.ty(), Some(meta))?;
                    this.session.restore_current_property(previous);
                    this.session.set_bean_property(&mut **target, &class, &name, value)
                }
                None => {
                    let value = this.parse_anything(&TypeHandle::any(), None)?;
                    this.session.on_unknown_property(&class, &name, &value)
                }
            }
        })?;

        let bean = match bean {
            Some(bean) => bean,
            None => self.session.new_bean(&class)?,
        };
        Ok(Value::Bean(BeanRef::from_box(bean)))
    }

    // -------------------------------------------------------------------------
    // Whitespace, comments and wrappers

    fn skip_comments_and_space(&mut self) -> Result<(), ParseError> {
        loop {
            self.session.reader_mut().take_while(char::is_whitespace);
            if self.peek() != Some('/') {
                return Ok(());
            }
            if self.strict() {
                return Err(self.error("Javascript comment detected."));
            }
            self.skip_comment()?;
        }
    }

    /// Skips a `/* */` or `//` comment starting at the current `/`.
    fn skip_comment(&mut self) -> Result<(), ParseError> {
        let reader = self.session.reader_mut();
        reader.next();
        match reader.next() {
            Some('*') => {
                while let Some(c) = reader.next() {
                    if c == '*' && reader.eat('/') {
                        return Ok(());
                    }
                }
            }
            Some('/') => {
                reader.take_while(|c| c != '\n');
                return Ok(());
            }
            _ => {}
        }
        Err(self.error("Open ended comment."))
    }

    /// Consumes `{wrapper:` ahead of a wrapped value.
    fn skip_wrapper_attr_start(&mut self, wrapper: &str) -> Result<(), ParseError> {
        if !self.eat('{') {
            return Err(self.error("Expected '{' at beginning of JSON object."));
        }
        self.skip_comments_and_space()?;
        if self.peek().is_none() {
            return Err(self.error("Could not find attribute name on JSON object."));
        }
        let name = self.parse_field_name()?;
        if name != wrapper {
            return Err(self.error(format!(
                "Expected to find wrapper attribute '{wrapper}' but found attribute '{name}'"
            )));
        }
        self.skip_comments_and_space()?;
        if !self.eat(':') {
            return Err(self.error("Could not find ':' following attribute name on JSON object."));
        }
        self.skip_comments_and_space()?;
        if self.peek().is_none() {
            return Err(self.error(EXPECTED_VALUE));
        }
        Ok(())
    }

    fn skip_wrapper_attr_end(&mut self) -> Result<(), ParseError> {
        self.skip_comments_and_space()?;
        if !self.eat('}') {
            return Err(self.error("Could not find '}' at the end of JSON wrapper object."));
        }
        Ok(())
    }

    /// Fails unless only whitespace, comments or a single `;` follow the
    /// parsed value.
    pub(crate) fn validate_end(&mut self) -> Result<(), ParseError> {
        self.skip_comments_and_space()?;
        match self.peek() {
            None | Some(';') => Ok(()),
            Some(c) => Err(self.error(format!("Remainder after parse: '{c}'."))),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::is_strict_number;

    #[test]
    fn strict_numbers() {
        for valid in ["0", "-0", "1", "-12", "0.5", "0e1", "1E+2", "10.25e-3"] {
            assert!(is_strict_number(valid), "{valid}");
        }
        for invalid in ["", "-", "01", "-01", ".5", "-.5", "1.", "1.e3", "0x1F"] {
            assert!(!is_strict_number(invalid), "{invalid}");
        }
    }
}
