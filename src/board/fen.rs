use super::{Board, CASTLE_BK, CASTLE_BQ, CASTLE_WK, CASTLE_WQ, Color, FenError, Piece};
use crate::square::Square;

fn piece_from_glyph(glyph: char) -> Option<(Color, Piece)> {
    let color = if glyph.is_ascii_uppercase() {
        Color::White
    } else {
        Color::Black
    };
    let piece = match glyph.to_ascii_lowercase() {
        'p' => Piece::Pawn,
        'n' => Piece::Knight,
        'b' => Piece::Bishop,
        'r' => Piece::Rook,
        'q' => Piece::Queen,
        'k' => Piece::King,
        _ => return None,
    };
    Some((color, piece))
}

fn glyph_for(color: Color, piece: Piece) -> char {
    let glyph = match piece {
        Piece::Pawn => 'p',
        Piece::Knight => 'n',
        Piece::Bishop => 'b',
        Piece::Rook => 'r',
        Piece::Queen => 'q',
        Piece::King => 'k',
    };
    match color {
        Color::White => glyph.to_ascii_uppercase(),
        Color::Black => glyph,
    }
}

impl Board {
    /// Reset this board from a FEN string. The halfmove clock and fullmove
    /// number fields are optional and default to 0 and 1.
    pub fn set_fen(&mut self, fen: &str) -> Result<(), FenError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() < 4 {
            return Err(FenError::TooFewFields {
                found: fields.len(),
            });
        }

        *self = Board::new_empty();

        // Field 1: piece placement, ranks 8 down to 1.
        let ranks: Vec<&str> = fields[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::BadRankLayout);
        }
        for (row, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - row as u8;
            let mut file = 0u8;
            for glyph in rank_str.chars() {
                if let Some(skip) = glyph.to_digit(10) {
                    file += skip as u8;
                } else {
                    let (color, piece) =
                        piece_from_glyph(glyph).ok_or(FenError::InvalidPiece { glyph })?;
                    if file >= 8 {
                        return Err(FenError::BadRankLayout);
                    }
                    let sq = Square::from_file_rank(file, rank);
                    let new_bb = self.bb(color, piece) | sq.bb();
                    self.set_bb(color, piece, new_bb);
                    file += 1;
                }
            }
            if file != 8 {
                return Err(FenError::BadRankLayout);
            }
        }

        for color in [Color::White, Color::Black] {
            if self.bb(color, Piece::King).count_ones() != 1 {
                return Err(FenError::BadKingCount { color });
            }
        }

        // Field 2: side to move.
        self.side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => {
                return Err(FenError::InvalidSideToMove {
                    found: other.to_string(),
                });
            }
        };

        // Field 3: castling rights, kept only while king and rook are home.
        if fields[2] != "-" {
            for glyph in fields[2].chars() {
                self.castling_rights |= match glyph {
                    'K' => CASTLE_WK,
                    'Q' => CASTLE_WQ,
                    'k' => CASTLE_BK,
                    'q' => CASTLE_BQ,
                    _ => return Err(FenError::InvalidCastling { glyph }),
                };
            }

            let white_rooks = self.bb(Color::White, Piece::Rook);
            let black_rooks = self.bb(Color::Black, Piece::Rook);
            let mut rights = self.castling_rights;
            if self.bb(Color::White, Piece::King) != 1 << 4 {
                rights &= !(CASTLE_WK | CASTLE_WQ);
            }
            if self.bb(Color::Black, Piece::King) != 1 << 60 {
                rights &= !(CASTLE_BK | CASTLE_BQ);
            }
            if white_rooks & (1 << 7) == 0 {
                rights &= !CASTLE_WK;
            }
            if white_rooks & 1 == 0 {
                rights &= !CASTLE_WQ;
            }
            if black_rooks & (1 << 63) == 0 {
                rights &= !CASTLE_BK;
            }
            if black_rooks & (1 << 56) == 0 {
                rights &= !CASTLE_BQ;
            }
            self.castling_rights = rights;
        }

        // Field 4: en-passant target. Kept only while an enemy pawn can
        // actually take; a phantom target would poison the hash.
        self.en_passant = match fields[3] {
            "-" => None,
            s => {
                let ep = Square::parse(s).ok_or_else(|| FenError::InvalidEnPassant {
                    found: s.to_string(),
                })?;
                let pawn_sq = match self.side_to_move {
                    Color::White => ep.index().checked_sub(8),
                    Color::Black => Some(ep.index() + 8),
                };
                match pawn_sq {
                    Some(idx) if idx < 64 => {
                        let pawn_sq = Square::from_index(idx);
                        if matches!(ep.rank(), 2 | 5)
                            && self.ep_capturable(pawn_sq, self.side_to_move)
                        {
                            Some(ep)
                        } else {
                            None
                        }
                    }
                    _ => {
                        return Err(FenError::InvalidEnPassant {
                            found: s.to_string(),
                        });
                    }
                }
            }
        };

        // Fields 5 and 6: clocks, optional.
        self.halfmove_clock = match fields.get(4) {
            Some(s) => s.parse().map_err(|_| FenError::InvalidCounter {
                found: s.to_string(),
            })?,
            None => 0,
        };
        self.fullmove_number = match fields.get(5) {
            Some(s) => s.parse().map_err(|_| FenError::InvalidCounter {
                found: s.to_string(),
            })?,
            None => 1,
        };

        self.history.clear();
        self.refresh_zobrist();
        Ok(())
    }

    /// Emit the position as a six-field FEN string.
    pub fn to_fen(&self) -> String {
        let mut fen = String::new();

        for rank in (0..8).rev() {
            let mut empty = 0;
            for file in 0..8 {
                let sq = Square::from_file_rank(file, rank);
                match self.piece_at(sq) {
                    Some((color, piece)) => {
                        if empty > 0 {
                            fen.push_str(&empty.to_string());
                            empty = 0;
                        }
                        fen.push(glyph_for(color, piece));
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                fen.push_str(&empty.to_string());
            }
            if rank > 0 {
                fen.push('/');
            }
        }

        fen.push(' ');
        fen.push(match self.side_to_move {
            Color::White => 'w',
            Color::Black => 'b',
        });

        fen.push(' ');
        if self.castling_rights == 0 {
            fen.push('-');
        } else {
            if self.castling_rights & CASTLE_WK != 0 {
                fen.push('K');
            }
            if self.castling_rights & CASTLE_WQ != 0 {
                fen.push('Q');
            }
            if self.castling_rights & CASTLE_BK != 0 {
                fen.push('k');
            }
            if self.castling_rights & CASTLE_BQ != 0 {
                fen.push('q');
            }
        }

        match self.en_passant {
            Some(ep) => {
                fen.push(' ');
                fen.push_str(&ep.to_string());
            }
            None => fen.push_str(" -"),
        }

        fen.push_str(&format!(
            " {} {}",
            self.halfmove_clock, self.fullmove_number
        ));
        fen
    }
}
