use nom::branch::alt;
use nom::bytes::complete::{is_not, tag, take_until, take_while};
use nom::character::complete::{anychar, char, crlf, space1};
use nom::combinator::{eof, map, opt, value};
use nom::sequence::{delimited, pair, separated_pair, terminated, tuple};
use nom::IResult;

// From nom recipes, one line comment // ...
fn eol_comment<'a>() -> impl FnMut(&'a str) -> IResult<&'a str, ()> {
    value(
        (), // Output is thrown away.
        pair(tag("//"), is_not("\n")),
    )
}

/// Consume an (optionally commented) end of line, including the empty last
/// line of a file.
pub fn end_of_line<'a>() -> impl FnMut(&'a str) -> IResult<&'a str, (Option<&'a str>, Option<()>)> {
    terminated(
        tuple((opt(space1), opt(eol_comment()))),
        alt((eof, tag("\n"), crlf)),
    )
}

/// Consume a `/* ... */` comment and return the number of lines it spans.
pub fn multiline_comment<'a>() -> impl FnMut(&'a str) -> IResult<&'a str, usize> {
    map(
        terminated(
            delimited(tag("/*"), take_until("*/"), tag("*/")),
            end_of_line(),
        ),
        |comment: &str| comment.chars().filter(|ch| *ch == '\n').count() + 1,
    )
}

fn quoted<'a>() -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    delimited(char('"'), take_until("\""), char('"'))
}

/// A Daitch-Mokotoff rule line : four quoted parts separated by spaces.
pub fn quadruplet<'a>() -> impl FnMut(&'a str) -> IResult<&'a str, (&'a str, &'a str, &'a str, &'a str)>
{
    tuple((
        terminated(quoted(), space1),
        terminated(quoted(), space1),
        terminated(quoted(), space1),
        terminated(quoted(), end_of_line()),
    ))
}

/// A folding rule line `à=a`.
pub fn folding<'a>() -> impl FnMut(&'a str) -> IResult<&'a str, (char, char)> {
    terminated(separated_pair(anychar, char('='), anychar), end_of_line())
}

/// A `/pattern/flags` delimited regex, the form used by the language
/// detection rule files. The pattern itself must not contain a `/`.
pub fn delimited_pattern<'a>() -> impl FnMut(&'a str) -> IResult<&'a str, (&'a str, &'a str)> {
    pair(
        delimited(char('/'), take_until("/"), char('/')),
        take_while(|c: char| c.is_ascii_alphabetic()),
    )
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;

    #[test]
    fn recognize_quadruplet_simple() -> Result<(), Box<dyn Error>> {
        let (remains, (part1, part2, part3, part4)) =
            quadruplet()("\"part1\"  \"part2\"\t \"part3\" \"part4\"")?;

        assert_eq!(remains, "");
        assert_eq!(part1, "part1");
        assert_eq!(part2, "part2");
        assert_eq!(part3, "part3");
        assert_eq!(part4, "part4");

        Ok(())
    }

    #[test]
    fn recognize_quadruplet_with_other_line() -> Result<(), Box<dyn Error>> {
        let (remains, (part1, _, _, part4)) =
            quadruplet()("\"part1\"  \"part2\"\t \"part3\" \"part4|part5\"\nOther data")?;

        assert_eq!(remains, "Other data");
        assert_eq!(part1, "part1");
        assert_eq!(part4, "part4|part5");

        Ok(())
    }

    #[test]
    fn recognize_quadruplet_with_comment() -> Result<(), Box<dyn Error>> {
        let (remains, (part1, part2, part3, part4)) =
            quadruplet()("\"part1\"  \"part2\"\t \"part3\" \"part4\" \t// This is a comment")?;

        assert_eq!(remains, "");
        assert_eq!(part1, "part1");
        assert_eq!(part2, "part2");
        assert_eq!(part3, "part3");
        assert_eq!(part4, "part4");

        Ok(())
    }

    #[test]
    fn recognize_quadruplet_missing_part() {
        let result: IResult<&str, (&str, &str, &str, &str)> =
            quadruplet()("\"part1\"  \"part2\"\t \"part3\" \t// This is a comment\nOther data");

        assert!(result.is_err());
    }

    #[test]
    fn folding_simple() -> Result<(), Box<dyn Error>> {
        let (remains, (ch1, ch2)) = folding()("ß=s")?;

        assert_eq!(remains, "");
        assert_eq!(ch1, 'ß');
        assert_eq!(ch2, 's');

        Ok(())
    }

    #[test]
    fn folding_with_comments() -> Result<(), Box<dyn Error>> {
        let (remains, (ch1, ch2)) = folding()("ó=o // This is one line comment")?;

        assert_eq!(remains, "");
        assert_eq!(ch1, 'ó');
        assert_eq!(ch2, 'o');

        Ok(())
    }

    #[test]
    fn folding_missing_char() {
        let result = folding()("ó=");

        assert!(result.is_err())
    }

    #[test]
    fn empty_line() -> Result<(), Box<dyn Error>> {
        let (remains, _) = end_of_line()("")?;

        assert_eq!(remains, "");

        Ok(())
    }

    #[test]
    fn commented_line_other_line() -> Result<(), Box<dyn Error>> {
        let (remains, _) = end_of_line()("   // This is a comment\nOther data")?;

        assert_eq!(remains, "Other data");

        Ok(())
    }

    #[test]
    fn multiline_comment_lines() -> Result<(), Box<dyn Error>> {
        let (remains, lines) = multiline_comment()("/* one\ntwo\nthree */\nOther data")?;

        assert_eq!(remains, "Other data");
        assert_eq!(lines, 3);

        Ok(())
    }

    #[test]
    fn delimited_pattern_simple() -> Result<(), Box<dyn Error>> {
        let (remains, (pattern, flags)) = delimited_pattern()("/^sch/")?;

        assert_eq!(remains, "");
        assert_eq!(pattern, "^sch");
        assert_eq!(flags, "");

        Ok(())
    }

    #[test]
    fn delimited_pattern_with_flags() -> Result<(), Box<dyn Error>> {
        let (remains, (pattern, flags)) = delimited_pattern()("/[а-я]/iu")?;

        assert_eq!(remains, "");
        assert_eq!(pattern, "[а-я]");
        assert_eq!(flags, "iu");

        Ok(())
    }

    #[test]
    fn delimited_pattern_not_delimited() {
        let result = delimited_pattern()("[а-я]");

        assert!(result.is_err());
    }
}
