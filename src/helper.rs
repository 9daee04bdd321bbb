/*
 * Licensed to the Apache Software Foundation (ASF) under one or more
 * contributor license agreements.  See the NOTICE file distributed with
 * this work for additional information regarding copyright ownership.
 * The ASF licenses this file to You under the Apache License, Version 2.0
 * (the "License"); you may not use this file except in compliance with
 * the License.  You may obtain a copy of the License at
 *
 *      http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */
/// Test if a char is a vowel.
///
/// Daitch-Mokotoff treats `j` and `y` as vowels when looking at the character
/// following a pattern, hence the `include_jy` flag.
pub fn is_vowel(c: Option<char>, include_jy: bool) -> bool {
    match c {
        Some(ch) => {
            matches!(ch, 'a' | 'e' | 'i' | 'o' | 'u') || (include_jy && matches!(ch, 'j' | 'y'))
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vowel() {
        assert!(is_vowel(Some('a'), false));
        assert!(is_vowel(Some('e'), false));
        assert!(is_vowel(Some('i'), false));
        assert!(is_vowel(Some('o'), false));
        assert!(is_vowel(Some('u'), false));
        assert!(!is_vowel(Some('b'), false));
        assert!(!is_vowel(Some('d'), false));
        assert!(!is_vowel(Some('z'), false));
        assert!(!is_vowel(Some('A'), false));
        assert!(!is_vowel(Some('3'), false));

        assert!(!is_vowel(Some('y'), false));
        assert!(!is_vowel(Some('j'), false));
        assert!(is_vowel(Some('y'), true));
        assert!(is_vowel(Some('j'), true));

        assert!(!is_vowel(None, false));
        assert!(!is_vowel(None, true));
    }
}
